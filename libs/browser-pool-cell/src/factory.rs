use std::sync::Arc;

use async_trait::async_trait;
use fantoccini::ClientBuilder;
use tracing::info;

use crate::error::PoolError;
use crate::fantoccini_page::FantocciniPage;
use crate::page::{NavigationWait, Page};

/// Creates the `Page` backing a court's session. Abstracted so tests can
/// substitute an in-memory fake instead of dialing a real WebDriver server.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, court: u32, base_url: &str) -> Result<Arc<dyn Page>, PoolError>;
}

/// Connects to a WebDriver endpoint (chromedriver/geckodriver) and navigates
/// the fresh session to the court's base schedule URL.
pub struct FantocciniSessionFactory {
    pub webdriver_url: String,
}

#[async_trait]
impl SessionFactory for FantocciniSessionFactory {
    async fn create(&self, court: u32, base_url: &str) -> Result<Arc<dyn Page>, PoolError> {
        info!(court, webdriver_url = %self.webdriver_url, "opening browser session");
        let client = ClientBuilder::native().connect(&self.webdriver_url).await?;
        let page = FantocciniPage::new(client);
        page.goto(base_url, NavigationWait::DomContentLoaded).await?;
        Ok(Arc::new(page))
    }
}
