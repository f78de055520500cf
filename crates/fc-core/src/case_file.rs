//! Case files: YAML descriptions of a resource test case
//!
//! A case file declares the resources a fixture-backed provider exposes (each
//! with its table tree and the rows the provider will "fetch"), plus the
//! flags of the test case itself.

use crate::diagnostics::Diagnostics;
use crate::error::{CoreError, CoreResult};
use crate::resource_name::ResourceName;
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// One row of fixture data.
///
/// Keys are column names of the table the row belongs to, or names of that
/// table's relations mapping to nested child rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureRow(pub BTreeMap<String, serde_yaml::Value>);

impl FixtureRow {
    /// Split the row into column values (in declared column order) and
    /// nested relation rows (in declared relation order).
    pub fn split<'t>(
        &self,
        table: &'t Table,
    ) -> CoreResult<(Vec<(&'t Column, &serde_yaml::Value)>, Vec<(&'t Table, Vec<FixtureRow>)>)>
    {
        for key in self.0.keys() {
            let known = table.column(key).is_some()
                || table.relations.iter().any(|r| r.name == *key);
            if !known {
                return Err(CoreError::UnknownFixtureKey {
                    table: table.name.to_string(),
                    key: key.clone(),
                });
            }
        }

        let values = table
            .columns
            .iter()
            .filter_map(|c| self.0.get(&c.name).map(|v| (c, v)))
            .collect();

        let mut relations = Vec::new();
        for relation in &table.relations {
            let Some(nested) = self.0.get(relation.name.as_str()) else {
                continue;
            };
            let rows: Vec<FixtureRow> = serde_yaml::from_value(nested.clone()).map_err(|e| {
                CoreError::UnsupportedFixtureValue {
                    column: relation.name.to_string(),
                    reason: format!("relation rows must be a list of mappings: {}", e),
                }
            })?;
            relations.push((relation, rows));
        }

        Ok((values, relations))
    }

    /// Recursively check every key against the table tree
    pub fn validate(&self, table: &Table) -> CoreResult<()> {
        let (_, relations) = self.split(table)?;
        for (relation, rows) in relations {
            for row in &rows {
                row.validate(relation)?;
            }
        }
        Ok(())
    }
}

/// A resource exposed by the fixture provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceFixture {
    /// Root table backing the resource
    pub table: Table,

    /// Rows inserted into the root table when the resource is fetched
    #[serde(default)]
    pub rows: Vec<FixtureRow>,

    /// Error reported in the fetch response for this resource
    #[serde(default)]
    pub error: Option<String>,

    /// Diagnostics reported in the fetch summary for this resource
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

/// A case file (`cases/*.yml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseFile {
    /// Case name, reported as the heading of its table results
    pub name: String,

    /// Run this case on its own instead of alongside other cases
    #[serde(default)]
    pub not_parallel: bool,

    /// Maximum resources fetched at once (0 = unbounded)
    #[serde(default)]
    pub parallel_fetching_limit: u64,

    /// Evaluate tables and columns marked `ignore_in_tests`
    #[serde(default)]
    pub skip_ignore_in_test: bool,

    /// Raw provider configuration payload
    #[serde(default)]
    pub config: String,

    /// Diagnostics the provider returns from its configure call
    #[serde(default)]
    pub configure_diagnostics: Diagnostics,

    /// Resources the provider declares
    pub resources: BTreeMap<ResourceName, ResourceFixture>,
}

impl CaseFile {
    /// Load and validate a case file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let case: CaseFile =
            serde_yaml::from_str(&content).map_err(|e| CoreError::CaseParseError {
                path: path.display().to_string(),
                details: e.to_string(),
            })?;
        case.validate().map_err(|e| CoreError::CaseParseError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        log::debug!(
            "Loaded case '{}' from {} ({} resources)",
            case.name,
            path.display(),
            case.resources.len()
        );
        Ok(case)
    }

    /// Validate table trees and fixture rows.
    ///
    /// Table names must be unique across every resource of the case, since
    /// all of them are provisioned side by side in one schema.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "case name cannot be empty".to_string(),
            });
        }
        if self.resources.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: format!("case '{}' declares no resources", self.name),
            });
        }

        let mut owners: HashMap<&str, &ResourceName> = HashMap::new();
        for (resource, fixture) in &self.resources {
            fixture.table.validate()?;
            for table in fixture.table.iter() {
                if let Some(first) = owners.insert(table.name.as_str(), resource) {
                    return Err(CoreError::DuplicateTable {
                        table: table.name.to_string(),
                        first: first.to_string(),
                        second: resource.to_string(),
                    });
                }
            }
            for row in &fixture.rows {
                row.validate(&fixture.table)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "case_file_test.rs"]
mod tests;
