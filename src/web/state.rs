use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::domain::DeletePolicy;
use crate::storage::Storage;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<dyn Clock>,
    pub delete_policy: DeletePolicy,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            delete_policy: DeletePolicy::default(),
            metrics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
