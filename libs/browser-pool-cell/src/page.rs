use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PoolError;

/// Progressive page-ready strategy used by the executor's navigation policy
/// (spec.md §4.D). Strategies are tried in order, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationWait {
    /// Fire the navigation and continue without waiting for load.
    Commit,
    /// Wait for the DOM content to be parsed.
    DomContentLoaded,
    /// Wait until no network activity for a brief window.
    NetworkIdle,
}

/// Abstraction over a single browser tab/page, implemented either by a real
/// WebDriver-backed client ([`crate::fantoccini_page::FantocciniPage`]) or an
/// in-memory fake for unit tests. Keeping the executor and form service
/// dependent on this trait, not on `fantoccini` directly, is what makes the
/// booking state machine unit-testable without a running browser.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str, wait: NavigationWait) -> Result<(), PoolError>;

    async fn current_url(&self) -> Result<String, PoolError>;

    /// Full visible body text, used for classification (confirmation
    /// phrases, bot-detection banners, validation error lists).
    async fn body_text(&self) -> Result<String, PoolError>;

    /// Runs a script in the page context and returns its JSON result,
    /// mirroring Playwright's `page.evaluate`.
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, PoolError>;

    /// Visible text of every element matching `selector`, in document order.
    async fn find_all_text(&self, selector: &str) -> Result<Vec<String>, PoolError>;

    /// Clicks the first element matching `selector`. Returns `false` if no
    /// element matched rather than erroring, so callers can distinguish
    /// "not present yet" from a genuine driver failure.
    async fn click(&self, selector: &str) -> Result<bool, PoolError>;

    /// Clicks the first visible `tag` element whose text contains `text`
    /// (used for the "Confirmar" button, matched by label before falling
    /// back to `button[type=submit]`).
    async fn click_matching_text(&self, tag: &str, text: &str) -> Result<bool, PoolError>;

    async fn exists(&self, selector: &str) -> Result<bool, PoolError>;

    /// Polls for `selector` to appear, up to `timeout`. Returns whether it
    /// appeared within the budget.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, PoolError>;

    /// Primary form-fill strategy: writes `value` directly into the
    /// element's DOM property and dispatches synthetic `input`/`change`
    /// events, the way a scripted write does. Returns `false` if the
    /// element was not found.
    async fn set_value(&self, selector: &str, value: &str) -> Result<bool, PoolError>;

    /// Fallback form-fill strategy mimicking a human: focus, clear, type,
    /// tab out. Used only when `set_value` reports the field as
    /// non-actionable.
    async fn type_into(&self, selector: &str, value: &str) -> Result<bool, PoolError>;

    /// Current `.value` property of the first element matching `selector`,
    /// empty string if absent. An `<input>`'s visible text is always empty
    /// regardless of what was typed into it, so validation reads the DOM
    /// property directly rather than `find_all_text`.
    async fn value_of(&self, selector: &str) -> Result<String, PoolError>;

    async fn close(&self) -> Result<(), PoolError>;
}
