//! Fetch response aggregation
//!
//! Responses arrive through an unbounded channel; a single aggregator task
//! owns the [`ResultListener`], so collected errors never need a lock. The
//! aggregator finishes once every [`ResponseSender`] is dropped.

use crate::error::{HarnessError, HarnessResult, ProviderError, ProviderResult};
use crate::provider::FetchResourcesResponse;
use fc_core::Diagnostic;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half handed to a provider's fetch call
#[derive(Debug, Clone)]
pub struct ResponseSender {
    tx: mpsc::UnboundedSender<FetchResourcesResponse>,
}

impl ResponseSender {
    pub fn send(&self, response: FetchResourcesResponse) -> ProviderResult<()> {
        self.tx.send(response).map_err(|_| ProviderError::SinkClosed)
    }

    /// Sender whose receiving half is already gone
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self { tx }
    }
}

/// Collects the errors and reportable diagnostics carried by streamed fetch
/// responses
#[derive(Debug, Default)]
pub struct ResultListener {
    errors: Vec<String>,
}

impl ResultListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one response.
    ///
    /// A non-empty error and every diagnostic above `ignore` severity are
    /// collected. Missing parts are skipped.
    pub fn receive(&mut self, response: &FetchResourcesResponse) {
        if !response.error.is_empty() {
            log::error!(
                "Resource {} fetch failed: {}",
                response.resource_name,
                response.error
            );
            self.errors.push(response.error.clone());
        }
        for diagnostic in response.summary.diagnostics.reportable() {
            let line = format_diagnostic(diagnostic);
            log::warn!("{}", line);
            self.errors.push(line);
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Spawn an aggregator task and return its sending half
    pub fn spawn() -> (ResponseSender, ListenerHandle) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let join = tokio::spawn(async move {
            let mut listener = ResultListener::new();
            while let Some(response) = rx.recv().await {
                listener.receive(&response);
            }
            listener
        });
        (ResponseSender { tx }, ListenerHandle { join })
    }
}

/// Diagnostic line printed for each reportable fetch diagnostic
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    format!(
        "resource: {}. summary: {}, details {}",
        diagnostic.resource, diagnostic.summary, diagnostic.detail
    )
}

/// Handle to a running aggregator
#[derive(Debug)]
pub struct ListenerHandle {
    join: JoinHandle<ResultListener>,
}

impl ListenerHandle {
    /// Wait for every sender to drop and return the collected errors
    pub async fn finish(self) -> HarnessResult<Vec<String>> {
        self.join
            .await
            .map(ResultListener::into_errors)
            .map_err(|e| HarnessError::Internal(format!("result listener failed: {}", e)))
    }
}
