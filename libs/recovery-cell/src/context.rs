use std::sync::Arc;

use browser_pool_cell::{BrowserPool, SessionFactory};

/// Execution context handed to a recovery strategy. A plain struct with
/// direct accessors, not the original's descriptor-style attribute proxy
/// (spec.md §9 Design Notes flags that pattern for replacement).
pub struct RecoveryContext {
    pub pool: Arc<BrowserPool>,
    pub factory: Arc<dyn SessionFactory>,
    pub emergency_url: String,
    pub failed_courts: Option<Vec<u32>>,
    pub error_context: Option<String>,
}

impl RecoveryContext {
    pub fn new(
        pool: Arc<BrowserPool>,
        factory: Arc<dyn SessionFactory>,
        emergency_url: String,
        failed_courts: Option<Vec<u32>>,
        error_context: Option<String>,
    ) -> Self {
        Self { pool, factory, emergency_url, failed_courts, error_context }
    }

    /// Courts this attempt should target: the failed set, or every court in
    /// the pool when the failure was reported as total.
    pub fn target_courts(&self) -> Vec<u32> {
        self.failed_courts.clone().unwrap_or_else(|| self.pool.courts())
    }
}
