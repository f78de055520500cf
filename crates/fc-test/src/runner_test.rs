use super::*;
use crate::error::{ProviderError, ProviderResult};
use crate::fixture::FixtureProvider;
use crate::listener::ResponseSender;
use crate::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, FetchResourcesRequest, Provider,
    ResourceMap,
};
use crate::report::{TableOutcome, TableReport};
use async_trait::async_trait;
use fc_core::{
    Column, ColumnType, Diagnostic, Diagnostics, ResourceFixture, ResourceName, Severity, Table,
};
use fc_db::Database;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn widgets_table() -> Table {
    Table::new("widgets")
        .with_column(Column::new("id", ColumnType::BigInt))
        .with_column(Column::new("notes", ColumnType::String).ignored_in_tests())
        .with_relation(
            Table::new("widget_tags").with_column(Column::new("tag", ColumnType::String)),
        )
}

fn widgets_fixture(rows: &str) -> ResourceFixture {
    ResourceFixture {
        table: widgets_table(),
        rows: serde_yaml::from_str(rows).unwrap(),
        error: None,
        diagnostics: Diagnostics::new(),
    }
}

fn runner() -> TestRunner {
    TestRunner::new(Arc::new(ConnectionProvisioner::with_url("duckdb://:memory:")))
}

fn case(name: &str, provider: FixtureProvider) -> ResourceTestCase {
    ResourceTestCase::new(name, Arc::new(provider))
}

const POPULATED: &str = r#"
- id: 1
  notes: null
  widget_tags:
    - tag: red
- id: 2
  notes: null
"#;

#[tokio::test]
async fn test_populated_widgets_pass() {
    let provider = FixtureProvider::new("widgets").with_resource("widgets", widgets_fixture(POPULATED));
    let report = runner().run(&case("populated", provider)).await.unwrap();

    assert!(report.passed());
    assert_eq!(report.case, "populated");
    let tree = &report.resources[0].tables[0];
    assert_eq!(tree.row_count, 2);
    assert_eq!(tree.path, "widgets");
    assert_eq!(tree.children[0].path, "widgets/widget_tags");
    assert_eq!(tree.children[0].outcome, TableOutcome::Passed);

    let summary = report.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.passed, 2);
}

#[tokio::test]
async fn test_null_id_fails_and_child_still_checked() {
    let rows = r#"
- widget_tags:
    - tag: red
- notes: null
"#;
    let provider = FixtureProvider::new("widgets").with_resource("widgets", widgets_fixture(rows));
    let report = runner().run(&case("null_id", provider)).await.unwrap();

    assert!(!report.passed());
    let tree = &report.resources[0].tables[0];
    assert_eq!(tree.nil_columns, vec!["id"]);
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].outcome, TableOutcome::Passed);
}

#[tokio::test]
async fn test_provisioning_resets_tables_between_runs() {
    let provisioner = Arc::new(ConnectionProvisioner::with_url("duckdb://:memory:"));
    let runner = TestRunner::new(provisioner.clone());
    let provider = Arc::new(
        FixtureProvider::new("widgets").with_resource("widgets", widgets_fixture(POPULATED)),
    );
    let case = ResourceTestCase::new("twice", provider);

    runner.run(&case).await.unwrap();
    let report = runner.run(&case).await.unwrap();
    assert_eq!(report.resources[0].tables[0].row_count, 2);

    let conn = provisioner.acquire().unwrap();
    assert_eq!(conn.database.select_all("widget_tags").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_errors_are_fatal() {
    let mut fixture = widgets_fixture(POPULATED);
    fixture.error = Some("quota exceeded".to_string());
    fixture.diagnostics = Diagnostics::from(vec![Diagnostic::new(
        Severity::Warning,
        "widgets",
        "partial page",
        "page 3",
    )]);
    let provider = FixtureProvider::new("widgets").with_resource("widgets", fixture);

    let err = runner().run(&case("errors", provider)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "[H007] error/s occur during test, quota exceeded, resource: widgets. summary: partial page, details page 3"
    );
}

#[tokio::test]
async fn test_ignore_diagnostics_do_not_fail() {
    let mut fixture = widgets_fixture(POPULATED);
    fixture.diagnostics = Diagnostics::from(vec![Diagnostic::new(
        Severity::Ignore,
        "widgets",
        "throttled",
        "",
    )]);
    let provider = FixtureProvider::new("widgets").with_resource("widgets", fixture);

    let report = runner().run(&case("ignored", provider)).await.unwrap();
    assert!(report.passed());
}

#[tokio::test]
async fn test_configure_error_diagnostic_stops_before_fetch() {
    let provider = FixtureProvider::new("widgets")
        .with_resource("widgets", widgets_fixture(POPULATED))
        .with_configure_diagnostics(Diagnostics::from(vec![Diagnostic::new(
            Severity::Error,
            "",
            "bad credentials",
            "",
        )]));
    let provisioner = Arc::new(ConnectionProvisioner::with_url("duckdb://:memory:"));
    let err = TestRunner::new(provisioner.clone())
        .run(&case("configure", provider))
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::ConfigureDiagnostics(_)));

    let conn = provisioner.acquire().unwrap();
    assert!(conn.database.select_all("widgets").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exempt_resource_is_not_fetched() {
    let mut fixture = widgets_fixture(POPULATED);
    fixture.table = fixture.table.ignored_in_tests();
    fixture.error = Some("must not be fetched".to_string());
    let provider = FixtureProvider::new("widgets").with_resource("widgets", fixture);

    let report = runner().run(&case("exempt", provider)).await.unwrap();
    assert!(report.passed());
    assert!(matches!(
        report.resources[0].tables[0].outcome,
        TableOutcome::Skipped { .. }
    ));
    assert!(report
        .logs
        .iter()
        .any(|e| e.message == "skipping resource: widgets in tests"));
}

#[tokio::test]
async fn test_connection_failure_is_fatal() {
    let provider = FixtureProvider::new("widgets").with_resource("widgets", widgets_fixture(POPULATED));
    let runner = TestRunner::new(Arc::new(ConnectionProvisioner::with_url(
        "postgres://localhost/none",
    )));
    let err = runner.run(&case("conn", provider)).await.unwrap_err();
    assert!(matches!(err, HarnessError::Connection(_)));
}

struct CountingVerifier {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Verifier for CountingVerifier {
    fn name(&self) -> &str {
        "counting"
    }

    async fn verify(&self, table: &Table, ctx: &VerifyContext<'_>) -> TableReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rows = ctx.db.select_all(&table.name).await.unwrap_or_default();
        TableReport::pass(table, table.name.to_string(), rows.len())
    }
}

#[tokio::test]
async fn test_custom_verifiers_replace_default() {
    // Every id is null: the default verifier would fail this table
    let provider = FixtureProvider::new("widgets")
        .with_resource("widgets", widgets_fixture("- notes: null\n"));
    let calls = Arc::new(AtomicUsize::new(0));
    let case = case("custom", provider)
        .with_verifier("widgets", Arc::new(CountingVerifier { calls: calls.clone() }))
        .with_verifier("widgets", Arc::new(CountingVerifier { calls: calls.clone() }));

    let report = runner().run(&case).await.unwrap();
    assert!(report.passed());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.resources[0].tables.len(), 2);
    assert!(report.resources[0].tables[0].children.is_empty());
}

fn gadgets_fixture() -> ResourceFixture {
    ResourceFixture {
        table: Table::new("gadgets").with_column(Column::new("label", ColumnType::String)),
        rows: serde_yaml::from_str("- label: dial\n").unwrap(),
        error: None,
        diagnostics: Diagnostics::new(),
    }
}

#[tokio::test]
async fn test_suite_keeps_input_order() {
    let runner = runner();
    let cases = vec![
        case(
            "widgets",
            FixtureProvider::new("widgets").with_resource("widgets", widgets_fixture(POPULATED)),
        ),
        case(
            "gadgets",
            FixtureProvider::new("gadgets").with_resource("gadgets", gadgets_fixture()),
        )
        .not_parallel(),
        case(
            "broken",
            FixtureProvider::new("broken").with_resource("broken", {
                let mut f = gadgets_fixture();
                f.table = Table::new("broken").with_column(Column::new("label", ColumnType::String));
                f.error = Some("offline".to_string());
                f
            }),
        ),
    ];

    let outcomes = runner.run_suite(cases).await;
    let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["widgets", "gadgets", "broken"]);
    assert!(outcomes[0].passed());
    assert!(outcomes[1].passed());
    assert!(!outcomes[2].passed());

    let (summary, setup_failures) = suite_summary(&outcomes);
    assert_eq!(setup_failures, 1);
    assert_eq!(summary.total, 3);
    assert!(summary.all_passed());
}

/// Provider with scripted failures that records what the harness asked of it
#[derive(Default)]
struct ScriptedProvider {
    resources: ResourceMap,
    fail_configure: bool,
    fail_fetch: bool,
    configure_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    requested: Mutex<Option<FetchResourcesRequest>>,
    logger: Mutex<Option<Arc<CaseLogger>>>,
}

impl ScriptedProvider {
    fn with_tables(tables: Vec<Table>) -> Self {
        let resources = tables
            .into_iter()
            .map(|t| (ResourceName::new(t.name.to_string()), t))
            .collect();
        Self {
            resources,
            ..Default::default()
        }
    }

    fn captured_messages(&self) -> Vec<String> {
        self.logger
            .lock()
            .unwrap()
            .as_ref()
            .map(|l| l.entries().into_iter().map(|e| e.message).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn resource_map(&self) -> &ResourceMap {
        &self.resources
    }

    fn set_logger(&self, logger: Arc<CaseLogger>) {
        *self.logger.lock().unwrap() = Some(logger);
    }

    async fn configure_provider(
        &self,
        _request: ConfigureProviderRequest,
    ) -> ProviderResult<ConfigureProviderResponse> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_configure {
            return Err(ProviderError::InvalidConfig("missing api key".to_string()));
        }
        Ok(ConfigureProviderResponse {
            diagnostics: Diagnostics::new(),
        })
    }

    async fn fetch_resources(
        &self,
        request: FetchResourcesRequest,
        _sender: ResponseSender,
    ) -> ProviderResult<()> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.requested.lock().unwrap() = Some(request);
        if self.fail_fetch {
            return Err(ProviderError::Other("connection reset".to_string()));
        }
        Ok(())
    }
}

fn label_table(name: &str) -> Table {
    Table::new(name).with_column(Column::new("label", ColumnType::String))
}

#[tokio::test]
async fn test_configure_failure_aborts_before_fetch() {
    let provider = Arc::new(ScriptedProvider {
        fail_configure: true,
        ..ScriptedProvider::with_tables(vec![label_table("orders")])
    });
    let case = ResourceTestCase::new("configure_fails", provider.clone());

    let err = runner().run(&case).await.unwrap_err();
    assert!(matches!(err, HarnessError::Configure(_)));
    assert_eq!(
        err.to_string(),
        "[H004] Provider configuration failed: [P002] Invalid provider configuration: missing api key"
    );
    assert_eq!(provider.configure_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_dispatch_failure_is_fatal() {
    let provider = Arc::new(ScriptedProvider {
        fail_fetch: true,
        ..ScriptedProvider::with_tables(vec![label_table("invoices")])
    });
    let case = ResourceTestCase::new("fetch_fails", provider.clone());

    let err = runner().run(&case).await.unwrap_err();
    assert!(matches!(err, HarnessError::Fetch(_)));
    assert!(err.to_string().starts_with("[H006] Fetch failed: "));
    assert!(err.to_string().ends_with("connection reset"));
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_request_carries_limit_and_requested_names() {
    let provider = Arc::new(ScriptedProvider::with_tables(vec![
        label_table("accounts"),
        label_table("archived_accounts").ignored_in_tests(),
        label_table("contacts"),
    ]));
    let case = ResourceTestCase::new("limit", provider.clone()).with_parallel_fetching_limit(3);

    // Nothing was inserted, so verification fails but setup succeeds
    let report = runner().run(&case).await.unwrap();
    assert!(!report.passed());

    let request = provider.requested.lock().unwrap().take().unwrap();
    assert_eq!(request.parallel_fetching_limit, 3);
    let names: Vec<&str> = request.resources.iter().map(|r| r.as_str()).collect();
    assert_eq!(names, vec!["accounts", "contacts"]);
}

#[tokio::test]
async fn test_exempt_resources_logged_before_configure_failure() {
    let provider = Arc::new(ScriptedProvider {
        fail_configure: true,
        ..ScriptedProvider::with_tables(vec![
            label_table("ledgers"),
            label_table("old_ledgers").ignored_in_tests(),
        ])
    });
    let case = ResourceTestCase::new("skip_then_fail", provider.clone());

    let err = runner().run(&case).await.unwrap_err();
    assert!(matches!(err, HarnessError::Configure(_)));
    assert!(provider
        .captured_messages()
        .contains(&"skipping resource: old_ledgers in tests".to_string()));
}
