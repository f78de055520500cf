//! In-process provider backed by a case file
//!
//! "Fetching" a resource inserts the case file's fixture rows into the
//! resource's table tree on the shared connection. Each row gets a fresh
//! `cq_id`, relation rows link to their parent through `cq_parent_id`, and
//! every row of one fetch shares a `cq_fetch_date`.

use crate::error::{ProviderError, ProviderResult};
use crate::listener::ResponseSender;
use crate::logger::CaseLogger;
use crate::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, ConnectionDetails,
    FetchResourcesRequest, FetchResourcesResponse, Provider, ResourceMap,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use fc_core::ddl::{CQ_FETCH_DATE, CQ_ID, CQ_PARENT_ID};
use fc_core::sql_utils::{quote_ident, quote_literal, render_literal};
use fc_core::{
    CaseFile, ConnectionString, CoreResult, Diagnostic, Diagnostics, Dialect, FixtureRow,
    ResourceFixture, ResourceName, Severity, Table,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use uuid::Uuid;

#[derive(Default)]
struct FixtureState {
    logger: Option<Arc<CaseLogger>>,
    connection: Option<(ConnectionDetails, Dialect)>,
}

/// Provider whose resources and rows are declared up front
pub struct FixtureProvider {
    name: String,
    resources: ResourceMap,
    fixtures: BTreeMap<ResourceName, ResourceFixture>,
    configure_diagnostics: Diagnostics,
    state: Mutex<FixtureState>,
}

impl FixtureProvider {
    /// Create a provider with no resources
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: ResourceMap::new(),
            fixtures: BTreeMap::new(),
            configure_diagnostics: Diagnostics::new(),
            state: Mutex::new(FixtureState::default()),
        }
    }

    /// Provider exposing every resource of a case file
    pub fn from_case_file(case: &CaseFile) -> Self {
        let mut provider = Self::new(case.name.clone())
            .with_configure_diagnostics(case.configure_diagnostics.clone());
        for (resource, fixture) in &case.resources {
            provider = provider.with_resource(resource.as_str(), fixture.clone());
        }
        provider
    }

    pub fn with_resource(mut self, resource: impl Into<String>, fixture: ResourceFixture) -> Self {
        let resource = ResourceName::new(resource);
        self.resources.insert(resource.clone(), fixture.table.clone());
        self.fixtures.insert(resource, fixture);
        self
    }

    /// Diagnostics returned from every configure call
    pub fn with_configure_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.configure_diagnostics = diagnostics;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn log_info(&self, message: String) {
        match &self.state().logger {
            Some(logger) => logger.info(message),
            None => log::info!("{}", message),
        }
    }
}

#[async_trait]
impl Provider for FixtureProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_map(&self) -> &ResourceMap {
        &self.resources
    }

    fn set_logger(&self, logger: Arc<CaseLogger>) {
        self.state().logger = Some(logger);
    }

    async fn configure_provider(
        &self,
        request: ConfigureProviderRequest,
    ) -> ProviderResult<ConfigureProviderResponse> {
        let dialect = ConnectionString::parse(&request.connection.dsn)?.dialect;

        let mut diagnostics = self.configure_diagnostics.clone();
        if let Err(reason) = check_config(&request.config) {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "",
                "invalid provider configuration",
                reason,
            ));
        }

        self.state().connection = Some((request.connection, dialect));
        Ok(ConfigureProviderResponse { diagnostics })
    }

    async fn fetch_resources(
        &self,
        request: FetchResourcesRequest,
        sender: ResponseSender,
    ) -> ProviderResult<()> {
        let (connection, dialect) = self
            .state()
            .connection
            .clone()
            .ok_or(ProviderError::NotConfigured)?;

        let permits = match request.parallel_fetching_limit {
            0 => request.resources.len().max(1),
            limit => usize::try_from(limit).unwrap_or(usize::MAX),
        };
        let semaphore = Arc::new(Semaphore::new(permits.min(Semaphore::MAX_PERMITS)));
        let fetch_date = Utc::now().naive_utc();

        let mut handles = Vec::with_capacity(request.resources.len());
        for resource in request.resources {
            let Some(fixture) = self.fixtures.get(&resource).cloned() else {
                sender.send(
                    FetchResourcesResponse::new(resource.as_str())
                        .with_error(format!("unknown resource {}", resource)),
                )?;
                continue;
            };

            let semaphore = semaphore.clone();
            let sender = sender.clone();
            let database = connection.database.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| ProviderError::Other(e.to_string()))?;

                let mut response = FetchResourcesResponse::new(resource.as_str());
                match insert_statements(dialect, &fixture.table, &fixture.rows, None, fetch_date) {
                    Ok(statements) => {
                        let mut inserted = 0u64;
                        for sql in &statements {
                            if let Err(e) = database.execute(sql).await {
                                response.error = e.to_string();
                                break;
                            }
                            inserted += 1;
                        }
                        response.summary.resource_count = inserted;
                    }
                    Err(e) => response.error = e.to_string(),
                }
                if let Some(error) = &fixture.error {
                    response.error = if response.error.is_empty() {
                        error.clone()
                    } else {
                        format!("{}; {}", response.error, error)
                    };
                }
                response.summary.diagnostics = fixture.diagnostics.clone();

                let count = response.summary.resource_count;
                sender.send(response)?;
                Ok::<_, ProviderError>(count)
            });
            handles.push(handle);
        }

        // Every task is awaited before the first failure is returned
        let mut total = 0;
        let mut first_error = None;
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|e| ProviderError::Other(format!("fetch task failed: {}", e)))
                .and_then(|result| result);
            match outcome {
                Ok(count) => total += count,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }
        self.log_info(format!("{}: fetched {} rows", self.name, total));
        Ok(())
    }
}

/// A blank payload or a YAML mapping
fn check_config(config: &[u8]) -> Result<(), String> {
    if config.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    let value: serde_yaml::Value = serde_yaml::from_slice(config).map_err(|e| e.to_string())?;
    if value.is_mapping() {
        Ok(())
    } else {
        Err("expected a mapping".to_string())
    }
}

/// INSERT statements for `rows` and their nested relation rows, each parent
/// row before its children
pub fn insert_statements(
    dialect: Dialect,
    table: &Table,
    rows: &[FixtureRow],
    parent_id: Option<&Uuid>,
    fetch_date: NaiveDateTime,
) -> CoreResult<Vec<String>> {
    let mut out = Vec::new();
    push_inserts(dialect, table, rows, parent_id, fetch_date, &mut out)?;
    Ok(out)
}

fn push_inserts(
    dialect: Dialect,
    table: &Table,
    rows: &[FixtureRow],
    parent_id: Option<&Uuid>,
    fetch_date: NaiveDateTime,
    out: &mut Vec<String>,
) -> CoreResult<()> {
    let fetched_at = fetch_date.format("%Y-%m-%d %H:%M:%S%.6f").to_string();
    for row in rows {
        let (values, relations) = row.split(table)?;
        let id = Uuid::new_v4();

        let mut columns = vec![quote_ident(CQ_ID)];
        let mut literals = vec![quote_literal(&id.to_string())];
        if let Some(parent) = parent_id {
            columns.push(quote_ident(CQ_PARENT_ID));
            literals.push(quote_literal(&parent.to_string()));
        }
        columns.push(quote_ident(CQ_FETCH_DATE));
        literals.push(quote_literal(&fetched_at));

        for (column, value) in values {
            columns.push(quote_ident(&column.name));
            literals.push(render_literal(dialect, column, value)?);
        }

        out.push(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&table.name),
            columns.join(", "),
            literals.join(", ")
        ));

        for (relation, nested) in relations {
            push_inserts(dialect, relation, &nested, Some(&id), fetch_date, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "fixture_test.rs"]
mod tests;
