//! Test case orchestration
//!
//! A case runs provision → fetch → verify in strict sequence on the shared
//! connection. Setup failures abort the case; verification failures are
//! recorded per table.

use crate::case::ResourceTestCase;
use crate::error::{HarnessError, HarnessResult};
use crate::fetch::fetch;
use crate::logger::CaseLogger;
use crate::provisioner::{self, ConnectionProvisioner};
use crate::report::{CaseReport, ResourceReport, VerificationSummary};
use crate::schema::SchemaManager;
use crate::verify::{NonEmptyColumns, Verifier, VerifyContext};
use fc_core::{CompileOptions, DefinitionCompiler, SchemaCompiler};
use log::LevelFilter;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one case in a suite
#[derive(Debug)]
pub struct CaseOutcome {
    pub name: String,
    pub result: HarnessResult<CaseReport>,
}

impl CaseOutcome {
    /// Setup succeeded and every table passed
    pub fn passed(&self) -> bool {
        self.result.as_ref().is_ok_and(CaseReport::passed)
    }
}

/// Runs resource test cases against a shared connection
#[derive(Clone)]
pub struct TestRunner {
    provisioner: Arc<ConnectionProvisioner>,
    compiler: Arc<dyn SchemaCompiler>,
    options: CompileOptions,
    log_level: LevelFilter,
}

impl TestRunner {
    /// Create a new test runner
    pub fn new(provisioner: Arc<ConnectionProvisioner>) -> Self {
        Self {
            provisioner,
            compiler: Arc::new(DefinitionCompiler),
            options: CompileOptions::default(),
            log_level: LevelFilter::Info,
        }
    }

    /// Runner using the process-wide provisioner
    pub fn global() -> Self {
        Self::new(provisioner::global())
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn SchemaCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Minimum level captured by each case logger
    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// Run a single case
    pub async fn run(&self, case: &ResourceTestCase) -> HarnessResult<CaseReport> {
        let start = Instant::now();

        let conn = self.provisioner.acquire()?;

        let logger = Arc::new(CaseLogger::new(&case.name).with_level(self.log_level));
        case.provider.set_logger(logger.clone());

        let resources = case.provider.resource_map();
        let schema = SchemaManager::new(conn.database.as_ref(), conn.dialect)
            .with_compiler(self.compiler.as_ref())
            .with_options(self.options.clone());
        for table in resources.values() {
            schema.provision(table).await?;
        }

        fetch(case, &conn, &logger).await?;

        let ctx = VerifyContext {
            db: conn.database.as_ref(),
            logger: &logger,
            skip_ignore_in_test: case.skip_ignore_in_test,
        };
        let mut reports = Vec::with_capacity(resources.len());
        for (resource, table) in resources {
            let mut tables = Vec::new();
            match case.verifiers.get(resource) {
                Some(verifiers) if !verifiers.is_empty() => {
                    for verifier in verifiers {
                        logger.debug(format!("verifying {} with {}", resource, verifier.name()));
                        tables.push(verifier.verify(table, &ctx).await);
                    }
                }
                _ => tables.push(NonEmptyColumns.verify(table, &ctx).await),
            }
            reports.push(ResourceReport {
                resource: resource.clone(),
                tables,
            });
        }

        let report = CaseReport {
            case: case.name.clone(),
            resources: reports,
            logs: logger.entries(),
            duration: start.elapsed(),
        };
        let summary = report.summary();
        log::info!(
            "Case {}: {} passed, {} failed, {} skipped, {} errors",
            case.name,
            summary.passed,
            summary.failed,
            summary.skipped,
            summary.errors
        );
        Ok(report)
    }

    /// Run many cases.
    ///
    /// Cases marked `not_parallel` run first, one at a time; the rest then
    /// run concurrently. Outcomes are returned in input order.
    pub async fn run_suite(&self, cases: Vec<ResourceTestCase>) -> Vec<CaseOutcome> {
        let mut outcomes: Vec<Option<CaseOutcome>> = (0..cases.len()).map(|_| None).collect();

        let (serial, parallel): (Vec<_>, Vec<_>) = cases
            .into_iter()
            .enumerate()
            .partition(|(_, case)| case.not_parallel);

        for (index, case) in serial {
            let result = self.run(&case).await;
            outcomes[index] = Some(CaseOutcome {
                name: case.name,
                result,
            });
        }

        let mut handles = Vec::with_capacity(parallel.len());
        for (index, case) in parallel {
            let runner = self.clone();
            let name = case.name.clone();
            let handle = tokio::spawn(async move { runner.run(&case).await });
            handles.push((index, name, handle));
        }

        for (index, name, handle) in handles {
            let result = handle
                .await
                .unwrap_or_else(|e| Err(HarnessError::Internal(format!("case task failed: {}", e))));
            outcomes[index] = Some(CaseOutcome { name, result });
        }

        outcomes.into_iter().flatten().collect()
    }
}

/// Totals across a suite
pub fn suite_summary(outcomes: &[CaseOutcome]) -> (VerificationSummary, usize) {
    let mut summary = VerificationSummary::default();
    let mut setup_failures = 0;
    let mut duration = Duration::ZERO;
    for outcome in outcomes {
        match &outcome.result {
            Ok(report) => {
                let case_summary = report.summary();
                duration = duration.max(case_summary.duration);
                summary.absorb(&case_summary);
            }
            Err(_) => setup_failures += 1,
        }
    }
    summary.duration = duration;
    (summary, setup_failures)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
