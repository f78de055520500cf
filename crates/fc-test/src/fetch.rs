//! Configure the provider and run one fetch of every verifiable resource

use crate::case::ResourceTestCase;
use crate::error::{HarnessError, HarnessResult};
use crate::listener::ResultListener;
use crate::logger::CaseLogger;
use crate::provider::{ConfigureProviderRequest, ConnectionDetails, FetchResourcesRequest};
use crate::provisioner::SharedConnection;
use fc_core::ResourceName;

/// Resource names to fetch, in resource-name order.
///
/// A resource whose root table is exempt is left out and the omission is
/// logged.
pub fn requested_resources(case: &ResourceTestCase, logger: &CaseLogger) -> Vec<ResourceName> {
    let mut names = Vec::new();
    for (resource, table) in case.provider.resource_map() {
        if table.is_exempt(case.skip_ignore_in_test) {
            logger.info(format!("skipping resource: {} in tests", resource));
            continue;
        }
        names.push(resource.clone());
    }
    names
}

/// Configure the provider against `conn`, fetch, and fail on any reported
/// error
pub async fn fetch(
    case: &ResourceTestCase,
    conn: &SharedConnection,
    logger: &CaseLogger,
) -> HarnessResult<()> {
    let provider = &case.provider;
    let resources = requested_resources(case, logger);

    let response = provider
        .configure_provider(ConfigureProviderRequest {
            protocol_version: String::new(),
            connection: ConnectionDetails {
                dsn: conn.url.clone(),
                database: conn.database.clone(),
            },
            config: case.config.as_bytes().to_vec(),
        })
        .await
        .map_err(HarnessError::Configure)?;

    if response.diagnostics.has_errors() {
        return Err(HarnessError::ConfigureDiagnostics(response.diagnostics));
    }
    for diagnostic in response.diagnostics.reportable() {
        logger.warn(diagnostic.to_string());
    }

    logger.info(format!(
        "fetch resources {}",
        resources
            .iter()
            .map(ResourceName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let (sender, listener) = ResultListener::spawn();
    provider
        .fetch_resources(
            FetchResourcesRequest {
                resources,
                parallel_fetching_limit: case.parallel_fetching_limit,
            },
            sender,
        )
        .await
        .map_err(HarnessError::Fetch)?;

    let errors = listener.finish().await?;
    if !errors.is_empty() {
        return Err(HarnessError::FetchErrors(errors));
    }
    Ok(())
}
