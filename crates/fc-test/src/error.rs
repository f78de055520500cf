//! Error types for fc-test
//!
//! Every [`HarnessError`] is fatal: it aborts the test case it occurred in.
//! Verification failures are not errors; they are recorded per table in the
//! case report.

use fc_core::{CoreError, Diagnostics};
use fc_db::DbError;
use thiserror::Error;

/// Errors raised by a provider implementation
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Fetch requested before a successful configure call (P001)
    #[error("[P001] Provider is not configured")]
    NotConfigured,

    /// Configuration payload rejected (P002)
    #[error("[P002] Invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// The response sink was closed before the fetch finished (P003)
    #[error("[P003] Fetch response sink closed")]
    SinkClosed,

    /// Database error while persisting fetched rows (P004)
    #[error("[P004] {0}")]
    Database(#[from] DbError),

    /// Schema or fixture error (P005)
    #[error("[P005] {0}")]
    Core(#[from] CoreError),

    /// Any other provider failure (P006)
    #[error("[P006] {0}")]
    Other(String),
}

/// Result type alias for ProviderError
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Fatal harness errors
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Shared connection could not be constructed (H001)
    #[error("[H001] Database connection failed: {0}")]
    Connection(String),

    /// Dropping or creating a table failed (H002)
    #[error("[H002] Failed to create tables {table}: {source}")]
    Provision {
        table: String,
        #[source]
        source: DbError,
    },

    /// CREATE statements could not be generated (H003)
    #[error("[H003] Failed to generate table definitions for {table}: {source}")]
    SchemaCompile {
        table: String,
        #[source]
        source: CoreError,
    },

    /// The provider's configure call failed (H004)
    #[error("[H004] Provider configuration failed: {0}")]
    Configure(#[source] ProviderError),

    /// The configure response carried error diagnostics (H005)
    #[error("[H005] Provider configuration reported errors: {0}")]
    ConfigureDiagnostics(Diagnostics),

    /// The fetch call itself failed (H006)
    #[error("[H006] Fetch failed: {0}")]
    Fetch(#[source] ProviderError),

    /// Responses streamed during the fetch carried errors (H007)
    #[error("[H007] error/s occur during test, {}", .0.join(", "))]
    FetchErrors(Vec<String>),

    /// Task or channel failure inside the harness (H008)
    #[error("[H008] Internal harness error: {0}")]
    Internal(String),
}

/// Result type alias for HarnessError
pub type HarnessResult<T> = Result<T, HarnessError>;
