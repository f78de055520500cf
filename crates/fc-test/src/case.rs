//! Test case definition

use crate::provider::Provider;
use crate::verify::Verifier;
use fc_core::ResourceName;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One provider test case
#[derive(Clone)]
pub struct ResourceTestCase {
    /// Case name. Table paths in the report are relative to it.
    pub name: String,

    pub provider: Arc<dyn Provider>,

    /// Raw configuration payload handed to the provider
    pub config: String,

    /// Run alone instead of alongside other cases
    pub not_parallel: bool,

    /// Maximum resources fetched at once (0 = unbounded)
    pub parallel_fetching_limit: u64,

    /// Evaluate tables and columns marked `ignore_in_tests`
    pub skip_ignore_in_test: bool,

    /// Per-resource replacements for the default verifier. Applied to the
    /// resource's root table only.
    pub verifiers: HashMap<ResourceName, Vec<Arc<dyn Verifier>>>,
}

impl ResourceTestCase {
    pub fn new(name: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        Self {
            name: name.into(),
            provider,
            config: String::new(),
            not_parallel: false,
            parallel_fetching_limit: 0,
            skip_ignore_in_test: false,
            verifiers: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }

    pub fn not_parallel(mut self) -> Self {
        self.not_parallel = true;
        self
    }

    pub fn with_parallel_fetching_limit(mut self, limit: u64) -> Self {
        self.parallel_fetching_limit = limit;
        self
    }

    pub fn skip_ignore_in_test(mut self) -> Self {
        self.skip_ignore_in_test = true;
        self
    }

    /// Add a verifier for `resource`. Once a resource has any verifier the
    /// default one no longer runs for it.
    pub fn with_verifier(
        mut self,
        resource: impl Into<String>,
        verifier: Arc<dyn Verifier>,
    ) -> Self {
        self.verifiers
            .entry(ResourceName::new(resource))
            .or_default()
            .push(verifier);
        self
    }
}

impl fmt::Debug for ResourceTestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceTestCase")
            .field("name", &self.name)
            .field("provider", &self.provider.name())
            .field("not_parallel", &self.not_parallel)
            .field("parallel_fetching_limit", &self.parallel_fetching_limit)
            .field("skip_ignore_in_test", &self.skip_ignore_in_test)
            .field("verifiers", &self.verifiers.len())
            .finish()
    }
}
