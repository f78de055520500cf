//! CREATE TABLE generation for provider table trees
//!
//! The harness only orders execution of the generated statements; this
//! module is the schema compiler that produces them.

use crate::config::Dialect;
use crate::error::{CoreError, CoreResult};
use crate::sql_utils::quote_ident;
use crate::table::{ColumnType, Table};

/// Row identity assigned on insert
pub const CQ_ID: &str = "cq_id";

/// Reference from a relation row to its parent row
pub const CQ_PARENT_ID: &str = "cq_parent_id";

/// Time the row was fetched
pub const CQ_FETCH_DATE: &str = "cq_fetch_date";

/// Columns the compiler adds to every table; declared columns may not reuse them
pub const SYSTEM_COLUMNS: &[&str] = &[CQ_ID, CQ_PARENT_ID, CQ_FETCH_DATE];

/// Options controlling DDL generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Add `cq_id`, `cq_fetch_date` and (for relations) `cq_parent_id`
    pub system_columns: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            system_columns: true,
        }
    }
}

/// Produces the ordered CREATE statements for a table subtree.
///
/// Statements must be ordered so every parent is created before its
/// relations.
pub trait SchemaCompiler: Send + Sync {
    fn create_table_definitions(
        &self,
        dialect: Dialect,
        table: &Table,
        options: &CompileOptions,
    ) -> CoreResult<Vec<String>>;
}

/// Default [`SchemaCompiler`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionCompiler;

impl SchemaCompiler for DefinitionCompiler {
    fn create_table_definitions(
        &self,
        dialect: Dialect,
        table: &Table,
        options: &CompileOptions,
    ) -> CoreResult<Vec<String>> {
        table.validate()?;
        let mut statements = Vec::new();
        push_definitions(dialect, table, None, options, &mut statements)?;
        Ok(statements)
    }
}

fn push_definitions(
    dialect: Dialect,
    table: &Table,
    parent: Option<&Table>,
    options: &CompileOptions,
    out: &mut Vec<String>,
) -> CoreResult<()> {
    out.push(create_table_sql(dialect, table, parent, options)?);
    for relation in &table.relations {
        push_definitions(dialect, relation, Some(table), options, out)?;
    }
    Ok(())
}

fn create_table_sql(
    dialect: Dialect,
    table: &Table,
    parent: Option<&Table>,
    options: &CompileOptions,
) -> CoreResult<String> {
    let mut defs: Vec<String> = Vec::new();

    if options.system_columns {
        defs.push(format!(
            "{} {} NOT NULL",
            quote_ident(CQ_ID),
            sql_type(dialect, ColumnType::Uuid)
        ));
        if let Some(parent) = parent {
            let reference = match dialect {
                Dialect::Postgres => format!(
                    " REFERENCES {}({}) ON DELETE CASCADE",
                    quote_ident(&parent.name),
                    quote_ident(CQ_ID)
                ),
                // DuckDB has no cascading foreign keys; a plain reference
                // would make the parent undroppable.
                Dialect::DuckDb => String::new(),
            };
            defs.push(format!(
                "{} {}{}",
                quote_ident(CQ_PARENT_ID),
                sql_type(dialect, ColumnType::Uuid),
                reference
            ));
        }
        defs.push(format!(
            "{} {}",
            quote_ident(CQ_FETCH_DATE),
            sql_type(dialect, ColumnType::Timestamp)
        ));
    }

    for column in &table.columns {
        defs.push(format!(
            "{} {}",
            quote_ident(&column.name),
            sql_type(dialect, column.column_type)
        ));
    }

    if defs.is_empty() {
        return Err(CoreError::InvalidTable {
            table: table.name.to_string(),
            reason: "table has no columns".to_string(),
        });
    }

    if options.system_columns {
        defs.push(format!("PRIMARY KEY ({})", quote_ident(CQ_ID)));
    }

    Ok(format!(
        "CREATE TABLE {} (\n    {}\n)",
        quote_ident(&table.name),
        defs.join(",\n    ")
    ))
}

/// SQL type for a column in the given dialect
pub fn sql_type(dialect: Dialect, column_type: ColumnType) -> &'static str {
    match dialect {
        Dialect::DuckDb => match column_type {
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Int => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Uuid => "UUID",
            ColumnType::String => "VARCHAR",
            ColumnType::StringArray => "VARCHAR[]",
            ColumnType::IntArray => "BIGINT[]",
            ColumnType::Timestamp => "TIMESTAMP",
            // JSON needs the json extension; store the text form.
            ColumnType::Json => "VARCHAR",
        },
        Dialect::Postgres => match column_type {
            ColumnType::Bool => "boolean",
            ColumnType::Int => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Float => "double precision",
            ColumnType::Uuid => "uuid",
            ColumnType::String => "text",
            ColumnType::StringArray => "text[]",
            ColumnType::IntArray => "bigint[]",
            ColumnType::Timestamp => "timestamp without time zone",
            ColumnType::Json => "jsonb",
        },
    }
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;
