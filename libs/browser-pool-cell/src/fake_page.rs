use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::PoolError;
use crate::page::{NavigationWait, Page};

/// Scriptable in-memory state backing [`FakePage`], shared with the test
/// that constructed it so assertions and further scripting can happen after
/// the code under test runs.
#[derive(Debug)]
pub struct FakeState {
    pub current_url: String,
    pub body_text: String,
    /// selector -> visible texts, consumed by `find_all_text`/`exists`.
    pub elements: HashMap<String, Vec<String>>,
    pub clicked_selectors: Vec<String>,
    pub clicked_matches: Vec<(String, String)>,
    pub navigations: Vec<String>,
    pub closed: bool,
    pub set_values: Vec<(String, String)>,
    pub typed_values: Vec<(String, String)>,
    /// selector -> current `.value`, written by `set_value`/`type_into` and
    /// read back by `value_of`, mirroring a real DOM input's value property.
    pub values: HashMap<String, String>,
    /// Selectors `set_value` should report as non-actionable, forcing the
    /// caller to fall back to `type_into`.
    pub set_value_rejects: Vec<String>,
    /// Canned return value for `execute`, consumed by availability/executor
    /// tests that script structured extraction results.
    pub execute_result: Value,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            current_url: String::new(),
            body_text: String::new(),
            elements: HashMap::new(),
            clicked_selectors: Vec::new(),
            clicked_matches: Vec::new(),
            navigations: Vec::new(),
            closed: false,
            set_values: Vec::new(),
            typed_values: Vec::new(),
            values: HashMap::new(),
            set_value_rejects: Vec::new(),
            execute_result: Value::Null,
        }
    }
}

/// Fake [`Page`] used by executor/form-service/availability unit tests so
/// the booking state machine can be exercised without a real browser.
#[derive(Clone)]
pub struct FakePage {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(FakeState::default())) }
    }

    pub async fn set_body_text(&self, text: impl Into<String>) {
        self.state.lock().await.body_text = text.into();
    }

    pub async fn set_elements(&self, selector: impl Into<String>, texts: Vec<String>) {
        self.state.lock().await.elements.insert(selector.into(), texts);
    }

    pub async fn set_current_url(&self, url: impl Into<String>) {
        self.state.lock().await.current_url = url.into();
    }

    /// Makes `set_value` report `false` for `selector`, simulating a field
    /// that needs the human-emulating fallback.
    pub async fn reject_set_value(&self, selector: impl Into<String>) {
        self.state.lock().await.set_value_rejects.push(selector.into());
    }

    /// Configures the value `execute` returns on subsequent calls.
    pub async fn execute_result(&self, value: Value) {
        self.state.lock().await.execute_result = value;
    }
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str, _wait: NavigationWait) -> Result<(), PoolError> {
        let mut state = self.state.lock().await;
        state.current_url = url.to_string();
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PoolError> {
        Ok(self.state.lock().await.current_url.clone())
    }

    async fn body_text(&self) -> Result<String, PoolError> {
        Ok(self.state.lock().await.body_text.clone())
    }

    async fn execute(&self, _script: &str, _args: Vec<Value>) -> Result<Value, PoolError> {
        Ok(self.state.lock().await.execute_result.clone())
    }

    async fn find_all_text(&self, selector: &str) -> Result<Vec<String>, PoolError> {
        Ok(self.state.lock().await.elements.get(selector).cloned().unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> Result<bool, PoolError> {
        let mut state = self.state.lock().await;
        let present = state.elements.contains_key(selector);
        if present {
            state.clicked_selectors.push(selector.to_string());
        }
        Ok(present)
    }

    async fn click_matching_text(&self, tag: &str, text: &str) -> Result<bool, PoolError> {
        let mut state = self.state.lock().await;
        state.clicked_matches.push((tag.to_string(), text.to_string()));
        Ok(true)
    }

    async fn exists(&self, selector: &str) -> Result<bool, PoolError> {
        Ok(self.state.lock().await.elements.contains_key(selector))
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool, PoolError> {
        self.exists(selector).await
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<bool, PoolError> {
        let mut state = self.state.lock().await;
        if state.set_value_rejects.iter().any(|s| s == selector) {
            return Ok(false);
        }
        let present = state.elements.contains_key(selector);
        if present {
            state.set_values.push((selector.to_string(), value.to_string()));
            state.values.insert(selector.to_string(), value.to_string());
        }
        Ok(present)
    }

    async fn type_into(&self, selector: &str, value: &str) -> Result<bool, PoolError> {
        let mut state = self.state.lock().await;
        let present = state.elements.contains_key(selector);
        if present {
            state.typed_values.push((selector.to_string(), value.to_string()));
            state.values.insert(selector.to_string(), value.to_string());
        }
        Ok(present)
    }

    async fn value_of(&self, selector: &str) -> Result<String, PoolError> {
        Ok(self.state.lock().await.values.get(selector).cloned().unwrap_or_default())
    }

    async fn close(&self) -> Result<(), PoolError> {
        self.state.lock().await.closed = true;
        Ok(())
    }
}
