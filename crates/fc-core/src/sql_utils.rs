//! SQL identifier and literal quoting utilities

use crate::config::Dialect;
use crate::error::{CoreError, CoreResult};
use crate::table::{Column, ColumnType};

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and doubles any embedded double
/// quotes, so reserved words and mixed-case names survive unchanged.
///
/// # Examples
/// ```
/// use fc_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// `DROP TABLE IF EXISTS "<name>" CASCADE`
pub fn drop_table_cascade_sql(name: &str) -> String {
    format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(name))
}

/// Render a YAML fixture value as a SQL literal for `column`.
pub fn render_literal(
    dialect: Dialect,
    column: &Column,
    value: &serde_yaml::Value,
) -> CoreResult<String> {
    use serde_yaml::Value;

    if value.is_null() {
        return Ok("NULL".to_string());
    }

    match column.column_type {
        ColumnType::Json => {
            let json = serde_json::to_string(value)?;
            Ok(quote_literal(&json))
        }
        ColumnType::StringArray | ColumnType::IntArray => {
            let Value::Sequence(items) = value else {
                return Err(unsupported(column, "expected a list"));
            };
            let rendered = items
                .iter()
                .map(|item| render_scalar(column, item))
                .collect::<CoreResult<Vec<_>>>()?;
            Ok(match dialect {
                Dialect::DuckDb => format!("[{}]", rendered.join(", ")),
                Dialect::Postgres if rendered.is_empty() => "'{}'".to_string(),
                Dialect::Postgres => format!("ARRAY[{}]", rendered.join(", ")),
            })
        }
        _ => render_scalar(column, value),
    }
}

fn render_scalar(column: &Column, value: &serde_yaml::Value) -> CoreResult<String> {
    use serde_yaml::Value;

    let textual = matches!(
        column.column_type,
        ColumnType::String
            | ColumnType::StringArray
            | ColumnType::Uuid
            | ColumnType::Timestamp
    );
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) if column.column_type == ColumnType::Bool => {
            Ok(if *b { "TRUE" } else { "FALSE" }.to_string())
        }
        Value::Number(n) if !textual && column.column_type != ColumnType::Bool => Ok(n.to_string()),
        Value::String(s) if textual => Ok(quote_literal(s)),
        Value::Bool(b) if textual => Ok(quote_literal(&b.to_string())),
        Value::Number(n) if textual => Ok(quote_literal(&n.to_string())),
        _ => Err(unsupported(
            column,
            &format!("value does not fit type {}", column.column_type),
        )),
    }
}

fn unsupported(column: &Column, reason: &str) -> CoreError {
    CoreError::UnsupportedFixtureValue {
        column: column.name.clone(),
        reason: reason.to_string(),
    }
}
