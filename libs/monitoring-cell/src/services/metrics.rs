use std::collections::HashMap;
use std::sync::Arc;

use recovery_cell::RecoveryOrchestrator;
use reservation_queue_cell::Store;

use crate::models::{status_label, MetricsResponse};

/// Aggregates queue and recovery counters for the metrics endpoint. Neither
/// source is mutated here; this service only reads and reshapes.
pub struct MetricsCollectorService {
    store: Arc<Store>,
    recovery: Arc<RecoveryOrchestrator>,
}

impl MetricsCollectorService {
    pub fn new(store: Arc<Store>, recovery: Arc<RecoveryOrchestrator>) -> Self {
        Self { store, recovery }
    }

    pub async fn snapshot(&self) -> MetricsResponse {
        let mut queue_by_status: HashMap<String, usize> = HashMap::new();
        for record in self.store.all().await {
            *queue_by_status.entry(status_label(record.status).to_string()).or_insert(0) += 1;
        }

        MetricsResponse { queue_by_status, recovery: self.recovery.stats().await }
    }
}
