//! Table verification
//!
//! The default engine checks that every verified table received at least one
//! row and that no required column is null in every row, then walks into the
//! table's relations. Resources may replace it with their own [`Verifier`].

use crate::logger::CaseLogger;
use crate::report::TableReport;
use async_trait::async_trait;
use fc_core::Table;
use fc_db::{Database, Row};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;

/// What a verifier gets to look at
pub struct VerifyContext<'a> {
    pub db: &'a dyn Database,
    pub logger: &'a CaseLogger,

    /// Evaluate tables and columns marked `ignore_in_tests`
    pub skip_ignore_in_test: bool,
}

/// Checks the rows persisted for one resource
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Name shown in logs
    fn name(&self) -> &str {
        "custom"
    }

    /// Verify `table` (the resource's root table) and report the outcome
    async fn verify(&self, table: &Table, ctx: &VerifyContext<'_>) -> TableReport;
}

/// The default verifier: rows present, no all-null required column
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyColumns;

#[async_trait]
impl Verifier for NonEmptyColumns {
    fn name(&self) -> &str {
        "non_empty_columns"
    }

    async fn verify(&self, table: &Table, ctx: &VerifyContext<'_>) -> TableReport {
        verify_table(table, ctx, String::new()).await
    }
}

fn verify_table<'a>(
    table: &'a Table,
    ctx: &'a VerifyContext<'a>,
    parent_path: String,
) -> BoxFuture<'a, TableReport> {
    async move {
        let path = if parent_path.is_empty() {
            table.name.to_string()
        } else {
            format!("{}/{}", parent_path, table.name)
        };

        // An exempt table is not read and neither are its relations
        if table.is_exempt(ctx.skip_ignore_in_test) {
            let reason = format!("table {} marked as IgnoreInTest. Skipping...", table.name);
            ctx.logger.info(reason.clone());
            return TableReport::skip(table, path, reason);
        }

        let rows = match ctx.db.select_all(&table.name).await {
            Ok(rows) => rows,
            Err(e) => {
                ctx.logger.error(format!("failed to read {}: {}", table.name, e));
                return TableReport::error(table, path, e.to_string());
            }
        };

        if rows.is_empty() {
            return TableReport::fail(
                table,
                path,
                format!(
                    "expected to have at least 1 entry at table {} got zero",
                    table.name
                ),
            );
        }

        let nil_columns = find_nil_columns(table, &rows, ctx.skip_ignore_in_test);
        let mut report = if nil_columns.is_empty() {
            TableReport::pass(table, path.clone(), rows.len())
        } else {
            let mut report = TableReport::fail(
                table,
                path.clone(),
                format!(
                    "found nil column in table {}. columns={}",
                    table.name,
                    nil_columns.join(",")
                ),
            );
            report.row_count = rows.len();
            report.nil_columns = nil_columns;
            report
        };

        for relation in &table.relations {
            report
                .children
                .push(verify_table(relation, ctx, path.clone()).await);
        }
        report
    }
    .boxed()
}

/// Required columns of `table` that are null in every row, in declared
/// order.
///
/// A column missing from the rows entirely counts as null. System columns
/// are never checked.
pub fn find_nil_columns(table: &Table, rows: &[Row], skip_ignore_in_test: bool) -> Vec<String> {
    let mut populated: HashMap<&str, bool> = table
        .required_columns(skip_ignore_in_test)
        .map(|c| (c.name.as_str(), false))
        .collect();

    for row in rows {
        for (column, seen) in populated.iter_mut() {
            if !*seen && row.get(*column).is_some_and(|v| !v.is_null()) {
                *seen = true;
            }
        }
    }

    table
        .required_columns(skip_ignore_in_test)
        .filter(|c| !populated.get(c.name.as_str()).copied().unwrap_or(false))
        .map(|c| c.name.clone())
        .collect()
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
