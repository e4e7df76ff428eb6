use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, Locator};
use serde_json::Value;
use tokio::time::{sleep, Instant};

use crate::error::PoolError;
use crate::page::{NavigationWait, Page};

/// Real `Page` implementation backed by a `fantoccini` WebDriver session.
/// One client per court; `fantoccini::Client` is cheaply `Clone` (it is a
/// handle over a shared connection), so the pool hands out clones freely.
pub struct FantocciniPage {
    client: Client,
}

impl FantocciniPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Page for FantocciniPage {
    async fn goto(&self, url: &str, wait: NavigationWait) -> Result<(), PoolError> {
        self.client.goto(url).await?;
        match wait {
            NavigationWait::Commit => {}
            NavigationWait::DomContentLoaded => {
                let _ = self
                    .client
                    .execute("return document.readyState", vec![])
                    .await;
            }
            NavigationWait::NetworkIdle => {
                sleep(Duration::from_millis(500)).await;
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PoolError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn body_text(&self) -> Result<String, PoolError> {
        let result = self
            .client
            .execute("return document.body.innerText || ''", vec![])
            .await?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, PoolError> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn find_all_text(&self, selector: &str) -> Result<Vec<String>, PoolError> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for mut el in elements {
            texts.push(el.text().await?);
        }
        Ok(texts)
    }

    async fn click(&self, selector: &str) -> Result<bool, PoolError> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(mut el) => {
                el.click().await?;
                Ok(true)
            }
            Err(fantoccini::error::CmdError::NoSuchElement(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn click_matching_text(&self, tag: &str, text: &str) -> Result<bool, PoolError> {
        let script = format!(
            "const els = Array.from(document.querySelectorAll('{tag}'));\
             const match = els.find(e => e.textContent.includes('{text}') && e.offsetParent !== null);\
             if (match) {{ match.click(); return true; }}\
             return false;"
        );
        let result = self.client.execute(&script, vec![]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn exists(&self, selector: &str) -> Result<bool, PoolError> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(_) => Ok(true),
            Err(fantoccini::error::CmdError::NoSuchElement(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, PoolError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.exists(selector).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(Duration::from_millis(200)).await;
        }
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<bool, PoolError> {
        let args = vec![Value::String(selector.to_string()), Value::String(value.to_string())];
        let script = "const [selector, value] = arguments;\
             const el = document.querySelector(selector);\
             if (!el) { return false; }\
             el.value = value;\
             el.dispatchEvent(new Event('input', { bubbles: true }));\
             el.dispatchEvent(new Event('change', { bubbles: true }));\
             return true;";
        let result = self.client.execute(script, args).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn type_into(&self, selector: &str, value: &str) -> Result<bool, PoolError> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(mut el) => {
                el.click().await?;
                el.clear().await?;
                el.send_keys(value).await?;
                el.send_keys("\t").await?;
                Ok(true)
            }
            Err(fantoccini::error::CmdError::NoSuchElement(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn value_of(&self, selector: &str) -> Result<String, PoolError> {
        let args = vec![Value::String(selector.to_string())];
        let script = "const [selector] = arguments;\
             const el = document.querySelector(selector);\
             return el ? (el.value || '') : '';";
        let result = self.client.execute(script, args).await?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    async fn close(&self) -> Result<(), PoolError> {
        self.client.clone().close().await?;
        Ok(())
    }
}
