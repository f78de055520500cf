//! fc-db - Database abstraction layer for Fetchcheck
//!
//! This crate provides the `Database` trait, the typed row model the
//! verification engine reads, and a DuckDB implementation.

pub mod connect;
pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use connect::connect;
pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
pub use value::{CellValue, Row, Scalar};
