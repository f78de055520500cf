//! Process-wide shared connection
//!
//! The first [`ConnectionProvisioner::acquire`] builds the connection; every
//! later call, from any thread, gets the same handle or the same cached
//! error. Construction is never retried.

use crate::error::{HarnessError, HarnessResult};
use fc_core::{resolve_database_url, ConnectionString, Dialect};
use fc_db::{Database, DbResult};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Opens a database from a connection string
pub type Connector = Box<dyn Fn(&str) -> DbResult<Arc<dyn Database>> + Send + Sync>;

/// The shared connection handed to every test case
#[derive(Clone)]
pub struct SharedConnection {
    /// Connection string the handle was opened from
    pub url: String,
    pub dialect: Dialect,
    pub database: Arc<dyn Database>,
}

impl fmt::Debug for SharedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedConnection")
            .field("url", &self.url)
            .field("dialect", &self.dialect)
            .finish()
    }
}

/// Lazily constructs one [`SharedConnection`] and caches the outcome
pub struct ConnectionProvisioner {
    url: Option<String>,
    connector: Connector,
    cell: OnceLock<Result<SharedConnection, String>>,
}

impl ConnectionProvisioner {
    /// Connection string read from `DATABASE_URL` on first acquire
    pub fn from_env() -> Self {
        Self::with_connector(None, Box::new(fc_db::connect))
    }

    /// Fixed connection string
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::with_connector(Some(url.into()), Box::new(fc_db::connect))
    }

    /// Custom connector; `url` of `None` resolves from the environment
    pub fn with_connector(url: Option<String>, connector: Connector) -> Self {
        Self {
            url,
            connector,
            cell: OnceLock::new(),
        }
    }

    /// Return the shared connection, constructing it on first use
    pub fn acquire(&self) -> HarnessResult<SharedConnection> {
        match self.cell.get_or_init(|| self.construct()) {
            Ok(conn) => Ok(conn.clone()),
            Err(message) => Err(HarnessError::Connection(message.clone())),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    fn construct(&self) -> Result<SharedConnection, String> {
        let url = match &self.url {
            Some(url) => url.clone(),
            None => resolve_database_url(None),
        };
        log::debug!("Opening shared connection: {}", url);
        let dialect = ConnectionString::parse(&url)
            .map_err(|e| e.to_string())?
            .dialect;
        let database = (self.connector)(&url).map_err(|e| e.to_string())?;
        Ok(SharedConnection {
            url,
            dialect,
            database,
        })
    }
}

impl Default for ConnectionProvisioner {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Debug for ConnectionProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProvisioner")
            .field("url", &self.url)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// The process-wide provisioner, configured from `DATABASE_URL`
pub fn global() -> Arc<ConnectionProvisioner> {
    static GLOBAL: OnceLock<Arc<ConnectionProvisioner>> = OnceLock::new();
    GLOBAL
        .get_or_init(|| Arc::new(ConnectionProvisioner::from_env()))
        .clone()
}
