//! Error types for fc-core

use thiserror::Error;

/// Core error type for Fetchcheck
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Unsupported connection string
    #[error("[E004] Unsupported connection string '{url}': {reason}")]
    InvalidConnectionString { url: String, reason: String },

    /// E005: Failed to parse a case file
    #[error("[E005] Failed to parse case file {path}: {details}")]
    CaseParseError { path: String, details: String },

    /// E006: Table tree is malformed
    #[error("[E006] Invalid table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    /// E007: Same table name declared twice within one provider
    #[error("[E007] Duplicate table name '{table}' (declared by resources '{first}' and '{second}')")]
    DuplicateTable {
        table: String,
        first: String,
        second: String,
    },

    /// E008: Fixture row key is neither a column nor a relation of its table
    #[error("[E008] Fixture row for table '{table}' has unknown key '{key}'")]
    UnknownFixtureKey { table: String, key: String },

    /// E009: Fixture value cannot be rendered as a SQL literal
    #[error("[E009] Unsupported fixture value for column '{column}': {reason}")]
    UnsupportedFixtureValue { column: String, reason: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
