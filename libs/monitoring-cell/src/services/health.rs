use std::sync::Arc;

use browser_pool_cell::BrowserPool;

use crate::models::HealthResponse;

/// Reads the browser pool's live health report. No write path: the pool is
/// the source of truth, this service only shapes it for the HTTP surface.
pub struct HealthMonitorService {
    pool: Arc<BrowserPool>,
}

impl HealthMonitorService {
    pub fn new(pool: Arc<BrowserPool>) -> Self {
        Self { pool }
    }

    pub async fn check(&self) -> HealthResponse {
        HealthResponse { report: self.pool.health_check().await }
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
    async fn reports_every_configured_court() {
        let mut urls = HashMap::new();
        urls.insert(1u32, "https://venue/court1".to_string());
        let pool = Arc::new(BrowserPool::new(urls, Arc::new(FakeFactory)));
        pool.start().await.unwrap();

        let service = HealthMonitorService::new(pool);
        let response = service.check().await;
        assert!(response.report.courts.contains_key(&1));
    }
}
