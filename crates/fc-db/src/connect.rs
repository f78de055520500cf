//! Open a database handle from a connection string

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use fc_core::{ConnectionString, Dialect};
use std::sync::Arc;

/// Open the backend a connection string points at.
///
/// Only DuckDB is backed by a driver; PostgreSQL strings parse (so DDL can be
/// generated for them) but cannot be opened.
pub fn connect(url: &str) -> DbResult<Arc<dyn Database>> {
    let conn = ConnectionString::parse(url).map_err(|e| DbError::ConnectionError(e.to_string()))?;
    match conn.dialect {
        Dialect::DuckDb => {
            log::debug!("Opening DuckDB database at {}", conn.target);
            Ok(Arc::new(DuckDbBackend::new(&conn.target)?))
        }
        Dialect::Postgres => Err(DbError::NotImplemented {
            backend: "postgres".to_string(),
            feature: "connections".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_memory() {
        let db = connect("duckdb://:memory:").unwrap();
        assert_eq!(db.db_type(), "duckdb");
    }

    #[test]
    fn test_connect_postgres_not_implemented() {
        let err = match connect("postgres://localhost/postgres") {
            Err(e) => e,
            Ok(_) => panic!("postgres connections are not supported"),
        };
        assert!(matches!(err, DbError::NotImplemented { .. }));
    }

    #[test]
    fn test_connect_invalid() {
        assert!(matches!(
            connect("ftp://nowhere"),
            Err(DbError::ConnectionError(_))
        ));
    }
}
