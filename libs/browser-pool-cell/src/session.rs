use std::sync::Arc;
use std::time::Instant;

use shared_models::BrowserSessionInfo;

use crate::page::Page;

/// One court's browser handle. Owned exclusively by [`crate::pool::BrowserPool`]
/// — callers only ever see a cloned `Arc<dyn Page>` through `get_page`.
pub struct Session {
    pub court: u32,
    pub page: Arc<dyn Page>,
    pub base_url: String,
    pub created_at: Instant,
}

impl Session {
    pub fn new(court: u32, page: Arc<dyn Page>, base_url: String) -> Self {
        Self { court, page, base_url, created_at: Instant::now() }
    }

    pub fn age_seconds(&self) -> i64 {
        self.created_at.elapsed().as_secs() as i64
    }

    pub async fn to_info(&self) -> BrowserSessionInfo {
        let current_url = self.page.current_url().await.unwrap_or_default();
        BrowserSessionInfo {
            court: self.court,
            current_url,
            age_seconds: self.age_seconds(),
            healthy: true,
            critical_operation: false,
        }
    }
}
