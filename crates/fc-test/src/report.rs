//! Verification results

use crate::logger::CapturedLogEntry;
use fc_core::{ResourceName, Table};
use std::fmt;
use std::time::Duration;

/// Outcome of verifying one table
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome {
    /// Rows present and every required column populated
    Passed,

    /// Verification ran and found a problem
    Failed { message: String },

    /// Table exempt from verification
    Skipped { reason: String },

    /// The table could not be read
    Error { message: String },
}

impl TableOutcome {
    fn symbol(&self) -> &'static str {
        match self {
            TableOutcome::Passed => "✓",
            TableOutcome::Failed { .. } | TableOutcome::Error { .. } => "✗",
            TableOutcome::Skipped { .. } => "-",
        }
    }
}

/// Result of verifying one table and, unless it stopped early, its relations
#[derive(Debug, Clone)]
pub struct TableReport {
    /// Table name
    pub table: String,

    /// Sub-test path: ancestor table names joined with `/`
    pub path: String,

    pub outcome: TableOutcome,

    /// Rows read from the table
    pub row_count: usize,

    /// Required columns that were null in every row, in declared order
    pub nil_columns: Vec<String>,

    /// Reports for the relations, in declared order
    pub children: Vec<TableReport>,
}

impl TableReport {
    fn with_outcome(table: &Table, path: String, outcome: TableOutcome) -> Self {
        Self {
            table: table.name.to_string(),
            path,
            outcome,
            row_count: 0,
            nil_columns: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a passed report
    pub fn pass(table: &Table, path: String, row_count: usize) -> Self {
        Self {
            row_count,
            ..Self::with_outcome(table, path, TableOutcome::Passed)
        }
    }

    /// Create a failed report
    pub fn fail(table: &Table, path: String, message: impl Into<String>) -> Self {
        Self::with_outcome(
            table,
            path,
            TableOutcome::Failed {
                message: message.into(),
            },
        )
    }

    /// Create a skipped report
    pub fn skip(table: &Table, path: String, reason: impl Into<String>) -> Self {
        Self::with_outcome(
            table,
            path,
            TableOutcome::Skipped {
                reason: reason.into(),
            },
        )
    }

    /// Create an error report
    pub fn error(table: &Table, path: String, message: impl Into<String>) -> Self {
        Self::with_outcome(
            table,
            path,
            TableOutcome::Error {
                message: message.into(),
            },
        )
    }

    /// Whether this table and every reported relation passed or was skipped
    pub fn passed(&self) -> bool {
        self.iter().all(|r| {
            matches!(
                r.outcome,
                TableOutcome::Passed | TableOutcome::Skipped { .. }
            )
        })
    }

    /// Pre-order traversal over this report and its descendants
    pub fn iter(&self) -> impl Iterator<Item = &TableReport> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Find a report by its table name
    pub fn find(&self, table: &str) -> Option<&TableReport> {
        self.iter().find(|r| r.table == table)
    }
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outcome.symbol(), self.path)?;
        match &self.outcome {
            TableOutcome::Passed => write!(f, " ({} rows)", self.row_count),
            TableOutcome::Failed { message } | TableOutcome::Error { message } => {
                write!(f, ": {}", message)
            }
            TableOutcome::Skipped { reason } => write!(f, ": {}", reason),
        }
    }
}

/// Verification results for one resource
#[derive(Debug, Clone)]
pub struct ResourceReport {
    pub resource: ResourceName,

    /// One report per verifier that ran for the resource
    pub tables: Vec<TableReport>,
}

impl ResourceReport {
    pub fn passed(&self) -> bool {
        self.tables.iter().all(TableReport::passed)
    }
}

/// Results of a complete test case
#[derive(Debug, Clone)]
pub struct CaseReport {
    /// Case name
    pub case: String,

    /// Per-resource results, in resource-name order
    pub resources: Vec<ResourceReport>,

    /// Records captured by the case logger
    pub logs: Vec<CapturedLogEntry>,

    /// Total execution time
    pub duration: Duration,
}

impl CaseReport {
    /// Whether every verified table passed
    pub fn passed(&self) -> bool {
        self.resources.iter().all(ResourceReport::passed)
    }

    /// Every table report, flattened in traversal order
    pub fn table_reports(&self) -> impl Iterator<Item = &TableReport> {
        self.resources
            .iter()
            .flat_map(|r| r.tables.iter())
            .flat_map(TableReport::iter)
    }

    /// Table reports that failed or errored
    pub fn failures(&self) -> Vec<&TableReport> {
        self.table_reports()
            .filter(|r| {
                matches!(
                    r.outcome,
                    TableOutcome::Failed { .. } | TableOutcome::Error { .. }
                )
            })
            .collect()
    }

    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary::from_reports(self.table_reports(), self.duration)
    }
}

/// Counts of table outcomes
#[derive(Debug, Clone, Default)]
pub struct VerificationSummary {
    /// Tables reported
    pub total: usize,

    /// Tables passed
    pub passed: usize,

    /// Tables failed
    pub failed: usize,

    /// Tables skipped as exempt
    pub skipped: usize,

    /// Tables that could not be read
    pub errors: usize,

    /// Total execution time
    pub duration: Duration,
}

impl VerificationSummary {
    /// Create a summary from table reports
    pub fn from_reports<'a>(
        reports: impl IntoIterator<Item = &'a TableReport>,
        duration: Duration,
    ) -> Self {
        let mut summary = Self {
            duration,
            ..Self::default()
        };
        for report in reports {
            summary.total += 1;
            match report.outcome {
                TableOutcome::Passed => summary.passed += 1,
                TableOutcome::Failed { .. } => summary.failed += 1,
                TableOutcome::Skipped { .. } => summary.skipped += 1,
                TableOutcome::Error { .. } => summary.errors += 1,
            }
        }
        summary
    }

    /// Merge another summary into this one
    pub fn absorb(&mut self, other: &VerificationSummary) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.duration += other.duration;
    }

    /// Check if all tables passed or were skipped
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}
