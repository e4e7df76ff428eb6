use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use browser_pool_cell::{BrowserPool, Page};
use chrono::NaiveDate;
use shared_config::Settings;
use tracing::{info, warn};

use crate::day_section::{parse_label, DaySection, RawDaySection};
use crate::error::AvailabilityError;
use crate::grouping::group_by_day;
use crate::selectors::{DAY_SECTION_EXTRACTION_SCRIPT, TIME_BUTTON_SELECTOR, UNAVAILABLE_MARKER_SELECTOR};

/// Bounded per-court timeout so one wedged page never stalls the overall
/// scan (spec.md §4.C.5: default 10s).
const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives each pooled browser page to its court's schedule and extracts
/// available time slots grouped by date.
pub struct AvailabilityChecker {
    pool: Arc<BrowserPool>,
    settings: Settings,
    check_timeout: Duration,
}

impl AvailabilityChecker {
    pub fn new(pool: Arc<BrowserPool>, settings: Settings) -> Self {
        Self { pool, settings, check_timeout: DEFAULT_CHECK_TIMEOUT }
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Checks every court in the pool, in parallel, never failing the
    /// overall call: a court that cannot be readied in time contributes an
    /// empty map instead of aborting the scan.
    pub async fn check_all_courts(&self) -> HashMap<u32, HashMap<NaiveDate, Vec<String>>> {
        let courts = self.pool.courts();
        let mut tasks = Vec::with_capacity(courts.len());

        for court in courts {
            let fut = self.check_court_bounded(court);
            tasks.push(async move { (court, fut.await) });
        }

        let results = futures::future::join_all(tasks).await;

        results
            .into_iter()
            .map(|(court, result)| {
                let slots = result.unwrap_or_else(|err| {
                    warn!(court, error = %err, "court availability check failed, reporting empty");
                    HashMap::new()
                });
                (court, slots)
            })
            .collect()
    }

    async fn check_court_bounded(
        &self,
        court: u32,
    ) -> Result<HashMap<NaiveDate, Vec<String>>, AvailabilityError> {
        match tokio::time::timeout(self.check_timeout, self.check_court(court)).await {
            Ok(result) => result,
            Err(_) => Err(AvailabilityError::NotReady(court)),
        }
    }

    /// Extracts available slots for a single court, assuming the page is
    /// already at (or refreshed to) the court's schedule URL.
    pub async fn check_court(
        &self,
        court: u32,
    ) -> Result<HashMap<NaiveDate, Vec<String>>, AvailabilityError> {
        let page = self
            .pool
            .get_page(court)
            .await
            .map_err(|err| AvailabilityError::Page(court, err))?;

        if page
            .exists(UNAVAILABLE_MARKER_SELECTOR)
            .await
            .map_err(|err| AvailabilityError::Page(court, err))?
        {
            info!(court, "court reports no availability");
            return Ok(HashMap::new());
        }

        let ready = page
            .wait_for_selector(TIME_BUTTON_SELECTOR, self.check_timeout)
            .await
            .map_err(|err| AvailabilityError::Page(court, err))?;
        if !ready {
            return Err(AvailabilityError::NotReady(court));
        }

        let sections = self.extract_sections(&page, court).await?;
        Ok(group_by_day(sections, self.settings.timezone, shared_utils::now_utc(), self.settings.booking_window_hours))
    }

    async fn extract_sections(
        &self,
        page: &Arc<dyn Page>,
        court: u32,
    ) -> Result<Vec<DaySection>, AvailabilityError> {
        let raw = page
            .execute(DAY_SECTION_EXTRACTION_SCRIPT, Vec::new())
            .await
            .map_err(|err| AvailabilityError::Page(court, err))?;

        let parsed: Vec<RawDaySection> = serde_json::from_value(raw)
            .map_err(|err| AvailabilityError::MalformedPayload(err.to_string()))?;

        if !parsed.is_empty() {
            return Ok(parsed
                .into_iter()
                .map(|raw| DaySection { label: parse_label(&raw.label), times: raw.times })
                .collect());
        }

        // Grouping markup missing: fall back to every visible time button,
        // assigned to today (spec.md §4.C.3).
        let times = page
            .find_all_text(TIME_BUTTON_SELECTOR)
            .await
            .map_err(|err| AvailabilityError::Page(court, err))?;

        if times.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![DaySection { label: crate::day_section::DayLabel::Today, times }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use browser_pool_cell::{FakePage, PoolError, SessionFactory};
    use serde_json::json;
    use shared_config::TestModeConfig;
    use std::collections::HashMap as Map;

    struct FakeFactory {
        page: Arc<dyn Page>,
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn create(&self, _court: u32, _base_url: &str) -> Result<Arc<dyn Page>, PoolError> {
            Ok(Arc::clone(&self.page))
        }
    }

    fn settings() -> Settings {
        Settings {
            timezone: chrono_tz::America::Guatemala,
            courts: vec![1],
            booking_window_hours: 48,
            poll_interval_seconds: 15,
            max_retries: 10,
            attempt_budget_seconds: 85,
            recovery_timeout_seconds: 60,
            max_recovery_attempts: 3,
            production_mode: true,
            test_mode: TestModeConfig { enabled: false, trigger_delay_minutes: 2, retain_failed_reservations: false },
        }
    }

    async fn pool_with_page(fake: FakePage) -> Arc<BrowserPool> {
        let page: Arc<dyn Page> = Arc::new(fake);
        let mut urls = Map::new();
        urls.insert(1, "https://venue.example.com/court/1".to_string());
        Arc::new(BrowserPool::new(urls, Arc::new(FakeFactory { page })))
    }

    #[tokio::test]
    async fn extracts_structured_day_sections() {
        let fake = FakePage::new();
        fake.set_elements(TIME_BUTTON_SELECTOR, vec!["08:00".into()]).await;
        fake.execute_result(json!([
            { "label": "today", "times": ["08:00", "09:00"] },
            { "label": "tomorrow", "times": ["10:00"] },
        ]))
        .await;

        let pool = pool_with_page(fake).await;
        let checker = AvailabilityChecker::new(pool, settings());
        let result = checker.check_court(1).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_ungrouped_times_when_markup_missing() {
        let fake = FakePage::new();
        fake.set_elements(TIME_BUTTON_SELECTOR, vec!["08:00".into(), "09:00".into()]).await;
        fake.execute_result(json!([])).await;

        let pool = pool_with_page(fake).await;
        let checker = AvailabilityChecker::new(pool, settings());
        let result = checker.check_court(1).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn unavailable_marker_short_circuits_to_empty() {
        let fake = FakePage::new();
        fake.set_elements(UNAVAILABLE_MARKER_SELECTOR, vec!["no courts today".into()]).await;

        let pool = pool_with_page(fake).await;
        let checker = AvailabilityChecker::new(pool, settings());
        let result = checker.check_court(1).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn check_all_courts_never_fails_on_an_unready_court() {
        let fake = FakePage::new();
        let pool = pool_with_page(fake).await;
        let checker = AvailabilityChecker::new(pool, settings()).with_check_timeout(Duration::from_millis(50));

        let result = checker.check_all_courts().await;
        assert_eq!(result.len(), 1);
        assert!(result[&1].is_empty());
    }
}
