//! fc-test - Resource test harness for Fetchcheck
//!
//! This crate provisions a provider's table trees on a shared connection,
//! drives the provider's configure and fetch calls, and verifies that every
//! non-exempt column of every table received data.

pub mod case;
pub mod error;
pub mod fetch;
pub mod fixture;
pub mod listener;
pub mod logger;
pub mod provider;
pub mod provisioner;
pub mod report;
pub mod runner;
pub mod schema;
pub mod verify;

pub use case::ResourceTestCase;
pub use error::{HarnessError, HarnessResult, ProviderError, ProviderResult};
pub use fixture::FixtureProvider;
pub use listener::{ResponseSender, ResultListener};
pub use logger::{CapturedLogEntry, CaseLogger};
pub use provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, ConnectionDetails,
    FetchResourcesRequest, FetchResourcesResponse, FetchSummary, Provider, ResourceMap,
};
pub use provisioner::{ConnectionProvisioner, SharedConnection};
pub use report::{CaseReport, ResourceReport, TableOutcome, TableReport, VerificationSummary};
pub use runner::{suite_summary, CaseOutcome, TestRunner};
pub use schema::SchemaManager;
pub use verify::{NonEmptyColumns, Verifier, VerifyContext};
