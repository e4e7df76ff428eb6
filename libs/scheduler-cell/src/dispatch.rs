use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use browser_pool_cell::BrowserPool;
use chrono::{DateTime, Utc};
use executor_cell::BookingExecutor;
use shared_models::{BookingRequest, BookingResult};
use tokio::task::JoinSet;
use tracing::warn;

use crate::assignment::BrowserAssignment;

/// One booking attempt ready to hand to the executor: the assignment that
/// decided the court/browser, and the hydrated request to submit.
pub struct DispatchJob {
    pub assignment: BrowserAssignment,
    pub request: BookingRequest,
}

/// Runs every job in `jobs` concurrently against the pool, bounded by
/// `batch_timeout` overall. Ported from the original's `dispatch_to_executors`:
/// jobs still running when the deadline hits are cancelled and reported as
/// "Booking timed out after N seconds" failures rather than left to run
/// unbounded (spec.md §5 Timeouts).
pub async fn dispatch_batch(
    executor: Arc<BookingExecutor>,
    pool: Arc<BrowserPool>,
    jobs: Vec<DispatchJob>,
    base_schedule_urls: Arc<HashMap<u32, String>>,
    window_open: DateTime<Utc>,
    target_play_time: DateTime<Utc>,
    batch_timeout: Duration,
) -> Vec<(String, BookingResult)> {
    let mut pending_ids: HashSet<String> = HashSet::new();
    let mut timeout_fallbacks: HashMap<String, BookingResult> = HashMap::new();
    let mut set = JoinSet::new();

    for job in jobs {
        let reservation_id = job.assignment.attempt.reservation_id.clone();
        pending_ids.insert(reservation_id.clone());
        timeout_fallbacks.insert(
            reservation_id.clone(),
            BookingResult::failure(
                job.request.user.clone(),
                job.request.request_id.clone(),
                Some(format!("Booking timed out after {} seconds", batch_timeout.as_secs())),
                vec![format!("Booking timed out after {} seconds", batch_timeout.as_secs())],
                Some(job.request.metadata.clone()),
                None,
                None,
            ),
        );

        let executor = executor.clone();
        let pool = pool.clone();
        let base_urls = base_schedule_urls.clone();
        let court = job.assignment.attempt.target_court;

        set.spawn(async move {
            let page = match pool.get_page(court).await {
                Ok(page) => page,
                Err(err) => {
                    return (
                        reservation_id,
                        BookingResult::failure(
                            job.request.user.clone(),
                            job.request.request_id.clone(),
                            Some(format!("no browser session available for court {court}: {err}")),
                            vec![err.to_string()],
                            Some(job.request.metadata.clone()),
                            None,
                            None,
                        ),
                    );
                }
            };
            let base_url = base_urls.get(&court).cloned().unwrap_or_default();
            let result = executor.run(page, &job.request, &base_url, court, window_open, target_play_time).await;
            (reservation_id, result)
        });
    }

    let mut results = Vec::with_capacity(pending_ids.len());
    let deadline = tokio::time::sleep(batch_timeout);
    tokio::pin!(deadline);

    loop {
        if pending_ids.is_empty() {
            break;
        }
        tokio::select! {
            _ = &mut deadline => {
                warn!(remaining = pending_ids.len(), "batch dispatch deadline hit, cancelling stragglers");
                set.abort_all();
                break;
            }
            joined = set.join_next() => {
                match joined {
                    Some(Ok((reservation_id, result))) => {
                        pending_ids.remove(&reservation_id);
                        results.push((reservation_id, result));
                    }
                    Some(Err(_)) => {
                        // Panicked or was aborted; the reservation stays in
                        // pending_ids and is folded into a timeout result below.
                    }
                    None => break,
                }
            }
        }
    }

    for reservation_id in pending_ids {
        if let Some(result) = timeout_fallbacks.remove(&reservation_id) {
            results.push((reservation_id, result));
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{Attempt, BrowserAssignment};
    use async_trait::async_trait;
    use browser_pool_cell::{FakePage, Page, PoolError, SessionFactory};
    use chrono::NaiveDate;
    use form_service_cell::FORM_SELECTORS;
    use shared_models::{BookingSource, BookingUser, CourtPreference};

    struct FakeFactory {
        page: Arc<dyn Page>,
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn create(&self, _court: u32, _base_url: &str) -> Result<Arc<dyn Page>, PoolError> {
            Ok(self.page.clone())
        }
    }

    fn user(id: &str) -> BookingUser {
        BookingUser {
            user_id: id.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555".into(),
            tier: None,
        }
    }

    fn request(id: &str) -> BookingRequest {
        BookingRequest {
            request_id: Some(id.into()),
            source: BookingSource::Queued,
            user: user(id),
            target_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            target_time: "08:00".into(),
            court_preference: CourtPreference::single(1),
            created_at: Utc::now(),
            metadata: std::collections::HashMap::new(),
            executor_config: None,
        }
    }

    fn happy_path_page() -> Arc<dyn Page> {
        let fake = FakePage::new();
        let page: Arc<dyn Page> = Arc::new(fake);
        page
    }

    #[tokio::test]
    async fn successful_job_is_reported_with_its_reservation_id() {
        let fake = FakePage::new();
        fake.set_elements("button.time-selection", vec!["08:00".into()]).await;
        for (_, selector) in FORM_SELECTORS {
            fake.set_elements(*selector, vec![String::new()]).await;
        }
        fake.set_current_url("https://venue.example.com/confirmation/XYZ").await;
        fake.set_body_text("Reserva confirmada").await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let mut urls = HashMap::new();
        urls.insert(1u32, "https://venue.example.com/court/1".to_string());
        let pool = Arc::new(BrowserPool::new(urls, Arc::new(FakeFactory { page })));
        pool.start().await.unwrap();

        let executor = Arc::new(BookingExecutor::new(10, Duration::from_secs(85)));
        let jobs = vec![DispatchJob {
            assignment: BrowserAssignment {
                browser_id: 1,
                attempt: Attempt { reservation_id: "r1".into(), target_court: 1, attempt_number: 1 },
            },
            request: request("r1"),
        }];

        let mut base_urls = HashMap::new();
        base_urls.insert(1u32, "https://venue.example.com/court/1".to_string());

        let now = Utc::now();
        let results = dispatch_batch(
            executor,
            pool,
            jobs,
            Arc::new(base_urls),
            now - chrono::Duration::seconds(1),
            now,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "r1");
        assert!(results[0].1.is_success());
    }

    #[tokio::test]
    async fn straggler_past_deadline_becomes_a_timeout_failure() {
        let page = happy_path_page();
        let mut urls = HashMap::new();
        urls.insert(1u32, "https://venue.example.com/court/1".to_string());
        let pool = Arc::new(BrowserPool::new(urls, Arc::new(FakeFactory { page })));
        pool.start().await.unwrap();

        // No time button ever appears: find_slot retries until max_retries,
        // guaranteeing this job is still in flight when the batch deadline
        // (shorter than the attempt budget) fires.
        let executor = Arc::new(BookingExecutor::new(50, Duration::from_secs(30)));
        let jobs = vec![DispatchJob {
            assignment: BrowserAssignment {
                browser_id: 1,
                attempt: Attempt { reservation_id: "r1".into(), target_court: 1, attempt_number: 1 },
            },
            request: request("r1"),
        }];

        let mut base_urls = HashMap::new();
        base_urls.insert(1u32, "https://venue.example.com/court/1".to_string());

        let now = Utc::now();
        let results = dispatch_batch(
            executor,
            pool,
            jobs,
            Arc::new(base_urls),
            now - chrono::Duration::seconds(1),
            now,
            Duration::from_millis(50),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].1.is_success());
        assert!(results[0].1.message.as_deref().unwrap().contains("timed out"));
    }
}
