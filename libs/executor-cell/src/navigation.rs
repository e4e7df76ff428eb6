use std::sync::Arc;
use std::time::Duration;

use browser_pool_cell::{NavigationWait, Page};
use tracing::debug;

use crate::error::ExecutorError;
use crate::selectors::{FORM_READY_SELECTOR, UNAVAILABLE_MARKER_SELECTOR};

/// One rung of the progressive page-ready ladder (spec.md §4.D Navigation
/// policy): a navigation strategy paired with how long to wait for the form
/// selector afterwards before escalating to the next rung.
struct Rung {
    wait: NavigationWait,
    settle: Duration,
}

const LADDER: &[Rung] = &[
    Rung { wait: NavigationWait::Commit, settle: Duration::from_secs(5) },
    Rung { wait: NavigationWait::DomContentLoaded, settle: Duration::from_secs(2) },
];

/// Navigates to `url`, escalating through commit -> domcontentloaded ->
/// networkidle until the form selector appears or the final rung's budget
/// is spent. Returns `Ok(true)` if the form became ready, `Ok(false)` if an
/// explicit "unavailable" marker was detected (clean short-circuit, spec.md
/// §4.D: "return a clean slot unavailable failure without waiting
/// further"), propagating page errors otherwise.
pub async fn navigate_progressively(
    page: &Arc<dyn Page>,
    url: &str,
    network_idle_budget: Duration,
) -> Result<bool, ExecutorError> {
    for rung in LADDER {
        page.goto(url, rung.wait).await?;

        if page.exists(UNAVAILABLE_MARKER_SELECTOR).await? {
            debug!(url, "unavailable marker detected mid-navigation");
            return Ok(false);
        }

        if page.wait_for_selector(FORM_READY_SELECTOR, rung.settle).await? {
            return Ok(true);
        }
    }

    page.goto(url, NavigationWait::NetworkIdle).await?;
    if page.exists(UNAVAILABLE_MARKER_SELECTOR).await? {
        return Ok(false);
    }
    Ok(page.wait_for_selector(FORM_READY_SELECTOR, network_idle_budget).await?)
}

/// Waits for the booking form to render after a slot click (no navigation
/// involved, so this is distinct from [`navigate_progressively`]): a short
/// wait, then a slightly longer one, then the remainder of
/// `total_budget`. Checks for the "unavailable" marker between rungs so a
/// vanished slot is recognized without waiting out the whole budget.
pub async fn await_form_ready(
    page: &Arc<dyn Page>,
    total_budget: Duration,
) -> Result<bool, ExecutorError> {
    let first = Duration::from_secs(5).min(total_budget);
    if page.wait_for_selector(FORM_READY_SELECTOR, first).await? {
        return Ok(true);
    }
    if page.exists(UNAVAILABLE_MARKER_SELECTOR).await? {
        return Ok(false);
    }

    let spent = first;
    let second = Duration::from_secs(2).min(total_budget.saturating_sub(spent));
    if !second.is_zero() && page.wait_for_selector(FORM_READY_SELECTOR, second).await? {
        return Ok(true);
    }
    if page.exists(UNAVAILABLE_MARKER_SELECTOR).await? {
        return Ok(false);
    }

    let remaining = total_budget.saturating_sub(spent + second);
    if remaining.is_zero() {
        return Ok(false);
    }
    Ok(page.wait_for_selector(FORM_READY_SELECTOR, remaining).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_pool_cell::FakePage;

    #[tokio::test]
    async fn form_ready_after_first_rung_short_circuits() {
        let fake = FakePage::new();
        fake.set_elements(FORM_READY_SELECTOR, vec![String::new()]).await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let ready = navigate_progressively(&page, "https://venue/court1", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(ready);
    }

    #[tokio::test]
    async fn unavailable_marker_short_circuits_without_waiting() {
        let fake = FakePage::new();
        fake.set_elements(UNAVAILABLE_MARKER_SELECTOR, vec![String::new()]).await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let ready = navigate_progressively(&page, "https://venue/court1", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!ready);
    }

    #[tokio::test]
    async fn never_ready_reports_false_after_full_ladder() {
        let fake = FakePage::new();
        let page: Arc<dyn Page> = Arc::new(fake);

        let ready = navigate_progressively(&page, "https://venue/court1", Duration::from_millis(10))
            .await
            .unwrap();
        assert!(!ready);
    }
}
