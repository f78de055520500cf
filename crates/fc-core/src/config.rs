//! Connection-string resolution and project configuration (fetchcheck.yml)

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Connection string used when neither the environment nor the project
/// configuration supplies one
pub const DEFAULT_DATABASE_URL: &str = "duckdb://:memory:";

const DUCKDB_SCHEME: &str = "duckdb://";
const MEMORY_PATH: &str = ":memory:";

/// SQL dialect used for DDL generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// DuckDB SQL dialect
    #[default]
    DuckDb,
    /// PostgreSQL dialect
    Postgres,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::DuckDb => write!(f, "duckdb"),
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Dialect::DuckDb),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(CoreError::ConfigInvalid {
                message: format!("unknown dialect '{}'", other),
            }),
        }
    }
}

/// Read `key` from the environment, falling back when it is unset
pub fn get_env(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Resolve the connection string: `DATABASE_URL`, then `configured`, then
/// [`DEFAULT_DATABASE_URL`].
pub fn resolve_database_url(configured: Option<&str>) -> String {
    get_env(
        DATABASE_URL_ENV,
        configured.unwrap_or(DEFAULT_DATABASE_URL),
    )
}

/// A parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Dialect of the target database
    pub dialect: Dialect,

    /// Database location: a file path or `:memory:` for DuckDB, the raw DSN
    /// otherwise
    pub target: String,

    /// The string as it was supplied
    pub raw: String,
}

impl ConnectionString {
    /// Parse a connection string.
    ///
    /// Accepted forms: `duckdb://<path>`, `duckdb://:memory:`, `:memory:`, a
    /// bare file path, `postgres://...` / `postgresql://...`, or a libpq-style
    /// `host=... user=...` key/value DSN.
    pub fn parse(url: &str) -> CoreResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidConnectionString {
                url: url.to_string(),
                reason: "connection string is empty".to_string(),
            });
        }

        if let Some(path) = trimmed.strip_prefix(DUCKDB_SCHEME) {
            let target = if path.is_empty() { MEMORY_PATH } else { path };
            return Ok(Self {
                dialect: Dialect::DuckDb,
                target: target.to_string(),
                raw: url.to_string(),
            });
        }

        if trimmed.starts_with("postgres://")
            || trimmed.starts_with("postgresql://")
            || is_key_value_dsn(trimmed)
        {
            return Ok(Self {
                dialect: Dialect::Postgres,
                target: trimmed.to_string(),
                raw: url.to_string(),
            });
        }

        if let Some((scheme, _)) = trimmed.split_once("://") {
            return Err(CoreError::InvalidConnectionString {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", scheme),
            });
        }

        Ok(Self {
            dialect: Dialect::DuckDb,
            target: trimmed.to_string(),
            raw: url.to_string(),
        })
    }

    /// Whether this points at a private in-memory database
    pub fn is_memory(&self) -> bool {
        self.dialect == Dialect::DuckDb && self.target == MEMORY_PATH
    }
}

fn is_key_value_dsn(s: &str) -> bool {
    s.split_whitespace()
        .next()
        .and_then(|first| first.split_once('='))
        .is_some_and(|(key, _)| {
            matches!(key, "host" | "user" | "dbname" | "password" | "port")
        })
}

/// Project configuration from fetchcheck.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Glob patterns (relative to the project directory) locating case files
    #[serde(default = "default_case_paths")]
    pub case_paths: Vec<String>,

    /// Dialect used when generating DDL; defaults to the connection's dialect
    #[serde(default)]
    pub dialect: Option<Dialect>,

    /// Connection string used when `DATABASE_URL` is unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Force evaluation of exempt tables and columns in every case
    #[serde(default)]
    pub skip_ignore_in_test: bool,
}

fn default_case_paths() -> Vec<String> {
    vec!["cases/*.yml".to_string(), "cases/*.yaml".to_string()]
}

impl ProjectConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: ProjectConfig =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    /// Looks for fetchcheck.yml or fetchcheck.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("fetchcheck.yml");
        let yaml_path = dir.join("fetchcheck.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }
        if self.case_paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one case path must be configured".to_string(),
            });
        }
        if let Some(url) = &self.database_url {
            ConnectionString::parse(url)?;
        }
        Ok(())
    }

    /// Case globs resolved against the project directory
    pub fn case_patterns(&self, root: &Path) -> Vec<PathBuf> {
        self.case_paths.iter().map(|p| root.join(p)).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
