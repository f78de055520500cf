//! Database trait definition

use crate::error::DbResult;
use crate::value::Row;
use async_trait::async_trait;
use fc_core::sql_utils::quote_ident;

/// Query-executing connection handle shared by every test case.
///
/// Implementations must be Send + Sync; one handle is used concurrently by
/// all running cases.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return every row as a column-name to value map
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// `DROP TABLE IF EXISTS` with cascading removal of dependents
    async fn drop_table_cascade(&self, name: &str) -> DbResult<()>;

    /// Every persisted row of `table`
    async fn select_all(&self, table: &str) -> DbResult<Vec<Row>> {
        self.query_rows(&format!("SELECT * FROM {}", quote_ident(table)))
            .await
    }

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
