//! Table tree declared by a provider
//!
//! Every resource a provider can fetch is backed by one root [`Table`]. A
//! table owns its columns and zero or more child tables ("relations") that
//! hold nested records. Child order is significant: it is the order used to
//! drop, create and verify the tree.

use crate::ddl::SYSTEM_COLUMNS;
use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column data type, mapped to a concrete SQL type per dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Bool,
    Int,
    BigInt,
    Float,
    Uuid,
    String,
    StringArray,
    IntArray,
    Timestamp,
    Json,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::BigInt => "big_int",
            ColumnType::Float => "float",
            ColumnType::Uuid => "uuid",
            ColumnType::String => "string",
            ColumnType::StringArray => "string_array",
            ColumnType::IntArray => "int_array",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

/// A declared column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Data type
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Column description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Never required to hold data unless exemptions are overridden
    #[serde(default)]
    pub ignore_in_tests: bool,
}

impl Column {
    /// Create a column that is required to hold data
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            description: None,
            ignore_in_tests: false,
        }
    }

    /// Mark the column as exempt from verification
    pub fn ignored_in_tests(mut self) -> Self {
        self.ignore_in_tests = true;
        self
    }

    /// Whether this column must be populated in at least one row.
    ///
    /// `skip_ignore_in_test` forces evaluation of exempt columns.
    pub fn is_required(&self, skip_ignore_in_test: bool) -> bool {
        skip_ignore_in_test || !self.ignore_in_tests
    }
}

/// A table node in a provider's table tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Relation name, unique within the provider
    pub name: TableName,

    /// Table description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared columns, in definition order
    #[serde(default)]
    pub columns: Vec<Column>,

    /// Child tables holding nested records
    #[serde(default)]
    pub relations: Vec<Table>,

    /// Skip verification of this table unless exemptions are overridden
    #[serde(default)]
    pub ignore_in_tests: bool,
}

impl Table {
    /// Create an empty table with no columns or relations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: TableName::new(name),
            description: None,
            columns: Vec::new(),
            relations: Vec::new(),
            ignore_in_tests: false,
        }
    }

    /// Append a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a child relation
    pub fn with_relation(mut self, relation: Table) -> Self {
        self.relations.push(relation);
        self
    }

    /// Mark the whole table as exempt from verification
    pub fn ignored_in_tests(mut self) -> Self {
        self.ignore_in_tests = true;
        self
    }

    /// Whether verification of this table is skipped.
    pub fn is_exempt(&self, skip_ignore_in_test: bool) -> bool {
        self.ignore_in_tests && !skip_ignore_in_test
    }

    /// Look up a declared column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that must be populated in at least one row
    pub fn required_columns(&self, skip_ignore_in_test: bool) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(move |c| c.is_required(skip_ignore_in_test))
    }

    /// Depth-first pre-order traversal: the table itself, then each
    /// relation subtree in declaration order.
    pub fn iter(&self) -> TableIter<'_> {
        TableIter { stack: vec![self] }
    }

    /// Find a table anywhere in this subtree
    pub fn find(&self, name: &str) -> Option<&Table> {
        self.iter().find(|t| t.name == name)
    }

    /// Depth of the deepest relation (a leaf table has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.relations.iter().map(Table::depth).max().unwrap_or(0)
    }

    /// Validate the subtree.
    ///
    /// Table names must be unique within the tree, column names unique within
    /// a table, and no declared column may shadow a system column.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen_tables = HashSet::new();
        for table in self.iter() {
            if !seen_tables.insert(table.name.as_str()) {
                return Err(CoreError::InvalidTable {
                    table: table.name.to_string(),
                    reason: format!("declared more than once under '{}'", self.name),
                });
            }

            let mut seen_columns = HashSet::new();
            for column in &table.columns {
                if column.name.is_empty() {
                    return Err(CoreError::InvalidTable {
                        table: table.name.to_string(),
                        reason: "column name must not be empty".to_string(),
                    });
                }
                if SYSTEM_COLUMNS.contains(&column.name.as_str()) {
                    return Err(CoreError::InvalidTable {
                        table: table.name.to_string(),
                        reason: format!("column '{}' is reserved", column.name),
                    });
                }
                if !seen_columns.insert(column.name.as_str()) {
                    return Err(CoreError::InvalidTable {
                        table: table.name.to_string(),
                        reason: format!("duplicate column '{}'", column.name),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Pre-order iterator over a table subtree
pub struct TableIter<'a> {
    stack: Vec<&'a Table>,
}

impl<'a> Iterator for TableIter<'a> {
    type Item = &'a Table;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.stack.pop()?;
        self.stack.extend(table.relations.iter().rev());
        Some(table)
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
