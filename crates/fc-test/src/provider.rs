//! The provider interface exercised by the harness
//!
//! A provider declares a map of resources to table trees, accepts a
//! configure call carrying the shared connection, then fetches resources and
//! streams one [`FetchResourcesResponse`] per resource through a
//! [`ResponseSender`].

use crate::error::ProviderResult;
use crate::listener::ResponseSender;
use crate::logger::CaseLogger;
use async_trait::async_trait;
use fc_core::{Diagnostics, ResourceName, Table};
use fc_db::Database;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Resources a provider exposes, keyed by resource name
pub type ResourceMap = BTreeMap<ResourceName, Table>;

/// Where fetched rows must be written
#[derive(Clone)]
pub struct ConnectionDetails {
    /// Connection string of the shared database
    pub dsn: String,

    /// Live handle to the shared database. In-process providers write
    /// through it; a private in-memory database cannot be reopened by DSN.
    pub database: Arc<dyn Database>,
}

impl fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("dsn", &self.dsn)
            .field("database", &self.database.db_type())
            .finish()
    }
}

/// Configure call arguments
#[derive(Debug, Clone)]
pub struct ConfigureProviderRequest {
    /// Empty when unspecified
    pub protocol_version: String,
    pub connection: ConnectionDetails,
    /// Raw provider configuration payload
    pub config: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureProviderResponse {
    pub diagnostics: Diagnostics,
}

/// Fetch call arguments
#[derive(Debug, Clone)]
pub struct FetchResourcesRequest {
    /// Resources to fetch, in resource-name order
    pub resources: Vec<ResourceName>,

    /// Maximum resources fetched at once (0 = unbounded)
    pub parallel_fetching_limit: u64,
}

/// Per-resource fetch statistics
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    /// Rows written for the resource
    pub resource_count: u64,
    pub diagnostics: Diagnostics,
}

/// One streamed fetch result
#[derive(Debug, Clone, Default)]
pub struct FetchResourcesResponse {
    pub resource_name: String,

    /// Empty on success
    pub error: String,

    pub summary: FetchSummary,
}

impl FetchResourcesResponse {
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    pub fn with_summary(mut self, summary: FetchSummary) -> Self {
        self.summary = summary;
        self
    }
}

/// A data-ingestion provider under test
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Declared resources and their table trees
    fn resource_map(&self) -> &ResourceMap;

    /// Install the logger the provider must use for the current case
    fn set_logger(&self, logger: Arc<CaseLogger>);

    /// Configure the provider. Configuration problems may be reported as
    /// error diagnostics instead of an `Err`.
    async fn configure_provider(
        &self,
        request: ConfigureProviderRequest,
    ) -> ProviderResult<ConfigureProviderResponse>;

    /// Fetch the requested resources, sending each result through `sender`.
    ///
    /// The fetch is complete once this returns and every clone of `sender`
    /// has been dropped.
    async fn fetch_resources(
        &self,
        request: FetchResourcesRequest,
        sender: ResponseSender,
    ) -> ProviderResult<()>;
}
