use std::sync::Arc;

use browser_pool_cell::BrowserPool;
use recovery_cell::RecoveryOrchestrator;
use tracing::warn;

/// Gates every dispatch behind a health check, escalating recovery first
/// when the pool can't serve every court (spec.md §4.H step 4 / step 5.b:
/// "run health gate before booking; if degraded, attempt recovery").
pub struct HealthGate {
    pool: Arc<BrowserPool>,
    recovery: Arc<RecoveryOrchestrator>,
}

impl HealthGate {
    pub fn new(pool: Arc<BrowserPool>, recovery: Arc<RecoveryOrchestrator>) -> Self {
        Self { pool, recovery }
    }

    /// Refreshes every session, recovers if needed, and returns the courts
    /// fit to receive a booking attempt right now.
    pub async fn ensure_ready(&self) -> Vec<u32> {
        self.pool.refresh_browser_pages().await;

        let (needed, failed_courts) = self.recovery.is_recovery_needed().await;
        if needed {
            let result = self.recovery.recover(failed_courts, Some("pre-dispatch health gate".to_string())).await;
            if !result.success {
                warn!(message = %result.message, "recovery did not fully clear the pool before dispatch");
            }
        }

        self.pool.get_available_courts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use browser_pool_cell::{FakePage, Page, PoolError, SessionFactory};
    use std::collections::HashMap;

    struct FakeFactory;

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn create(&self, _court: u32, _base_url: &str) -> Result<Arc<dyn Page>, PoolError> {
            Ok(Arc::new(FakePage::new()))
        }
    }

    #[tokio::test]
    async fn healthy_pool_needs_no_recovery_and_reports_all_courts() {
        let mut urls = HashMap::new();
        urls.insert(1, "https://venue/court1".to_string());
        urls.insert(2, "https://venue/court2".to_string());
        let pool = Arc::new(BrowserPool::new(urls, Arc::new(FakeFactory)));
        pool.start().await.unwrap();

        let recovery = Arc::new(RecoveryOrchestrator::new(pool.clone(), Arc::new(FakeFactory), "https://venue/emergency".into()));
        let gate = HealthGate::new(pool, recovery);

        let available = gate.ensure_ready().await;
        assert_eq!(available, vec![1, 2]);
    }
}
