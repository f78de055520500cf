//! Test command implementation

use anyhow::Result;
use fc_test::{
    suite_summary, CaseOutcome, ConnectionProvisioner, FixtureProvider, ResourceTestCase,
    TableOutcome, TestRunner,
};
use log::Level;
use std::sync::Arc;

use crate::cli::{GlobalArgs, TestArgs};
use crate::commands::common::{CommandContext, ExitCode};
use crate::logger;

/// Execute the test command
pub async fn execute(args: &TestArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global, &args.cases)?;
    if ctx.cases.is_empty() {
        println!("No test cases to run.");
        return Ok(());
    }

    let project_override = ctx
        .project
        .as_ref()
        .is_some_and(|p| p.skip_ignore_in_test);

    let cases: Vec<ResourceTestCase> = ctx
        .cases
        .iter()
        .map(|loaded| {
            let case = &loaded.case;
            let mut test_case =
                ResourceTestCase::new(&case.name, Arc::new(FixtureProvider::from_case_file(case)))
                    .with_config(&case.config)
                    .with_parallel_fetching_limit(case.parallel_fetching_limit);
            if case.not_parallel {
                test_case = test_case.not_parallel();
            }
            if case.skip_ignore_in_test || project_override || args.include_ignored {
                test_case = test_case.skip_ignore_in_test();
            }
            test_case
        })
        .collect();

    let url = ctx.database_url(global);
    log::debug!("Using database {}", url);
    let runner = TestRunner::new(Arc::new(ConnectionProvisioner::with_url(url)))
        .with_log_level(logger::case_level(global.verbose));

    println!("Running {} test cases...\n", cases.len());
    let outcomes = runner.run_suite(cases).await;

    for outcome in &outcomes {
        print_outcome(outcome, global.verbose);
    }

    let (summary, setup_failures) = suite_summary(&outcomes);
    println!();
    println!(
        "Passed: {}, Failed: {}, Skipped: {}",
        summary.passed,
        summary.failed + summary.errors + setup_failures,
        summary.skipped
    );

    if !summary.all_passed() || setup_failures > 0 {
        // Exit code 2 = test failures
        return Err(ExitCode(2).into());
    }
    Ok(())
}

fn print_outcome(outcome: &CaseOutcome, verbose: bool) {
    let report = match &outcome.result {
        Ok(report) => report,
        Err(e) => {
            println!("  ✗ {} - {}", outcome.name, e);
            return;
        }
    };

    println!(
        "  {} {} [{}ms]",
        if report.passed() { "✓" } else { "✗" },
        report.case,
        report.duration.as_millis()
    );
    for table in report.table_reports() {
        println!("    {}", table);
        if verbose && matches!(table.outcome, TableOutcome::Failed { .. }) {
            println!("      rows: {}", table.row_count);
        }
    }

    for entry in &report.logs {
        if verbose || entry.level <= Level::Warn {
            println!("    | {}", entry.display());
        }
    }
}
