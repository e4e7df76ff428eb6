use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use browser_pool_cell::BrowserPool;
use chrono::Utc;
use executor_cell::BookingExecutor;
use notifier_cell::NotificationDispatcher;
use reservation_queue_cell::Store;
use shared_config::Settings;
use shared_models::{BookingRequest, ReservationStatus};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::assignment::AssignmentOrchestrator;
use crate::batch::{evaluate_pending, Batch};
use crate::dispatch::{dispatch_batch, DispatchJob};
use crate::health_gate::HealthGate;
use crate::hydrate::hydrate_batch;
use crate::user_directory::UserDirectory;

/// Drives one venue's booking pipeline end to end (spec.md §4.H): polls the
/// queue, buckets due reservations, gates on pool health, hands each slot's
/// contenders to the Assignment Orchestrator, and dispatches the resulting
/// attempts.
pub struct Scheduler {
    store: Arc<Store>,
    pool: Arc<BrowserPool>,
    health_gate: HealthGate,
    assignment: AssignmentOrchestrator,
    executor: Arc<BookingExecutor>,
    dispatcher: Arc<NotificationDispatcher>,
    directory: Arc<dyn UserDirectory>,
    settings: Settings,
    base_schedule_urls: Arc<HashMap<u32, String>>,
    failed_retry_delay: Duration,
}

impl Scheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<Store>,
        pool: Arc<BrowserPool>,
        health_gate: HealthGate,
        executor: Arc<BookingExecutor>,
        dispatcher: Arc<NotificationDispatcher>,
        directory: Arc<dyn UserDirectory>,
        settings: Settings,
        base_schedule_urls: HashMap<u32, String>,
    ) -> Self {
        Self {
            store,
            pool,
            health_gate,
            assignment: AssignmentOrchestrator::new(),
            executor,
            dispatcher,
            directory,
            settings,
            base_schedule_urls: Arc::new(base_schedule_urls),
            failed_retry_delay: FAILED_RETRY_DELAY,
        }
    }

    /// Overrides the test-mode failed-retry delay. Used by tests so the
    /// retry path doesn't need to wait out the real fixed delay.
    pub fn with_failed_retry_delay(mut self, delay: Duration) -> Self {
        self.failed_retry_delay = delay;
        self
    }

    /// Polls until `shutdown` fires, then returns. The in-flight tick, if
    /// any, is allowed to finish — cancellation never interrupts a batch
    /// mid-dispatch (spec.md §5: "the scheduler exits cleanly on
    /// cancellation").
    pub async fn run(&self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.settings.poll_interval_seconds));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = &mut shutdown => {
                    info!("scheduler received shutdown signal, exiting after current tick");
                    break;
                }
            }
        }
    }

    /// Runs one poll cycle: health-check lookahead batches are only used to
    /// warm the pool, then every ready batch is processed in turn.
    pub async fn tick(&self) {
        let now = Utc::now();
        let pending = self.store.list_pending().await;
        let evaluation = evaluate_pending(pending, now);

        if !evaluation.health_check.is_empty() {
            self.health_gate.ensure_ready().await;
        }

        for batch in evaluation.ready {
            self.process_ready_batch(batch, now).await;
        }
    }

    async fn process_ready_batch(&self, batch: Batch, now: chrono::DateTime<Utc>) {
        for record in &batch.records {
            if record.status == ReservationStatus::Pending {
                if let Err(err) = self.store.update_status(&record.id, ReservationStatus::Scheduled, None).await {
                    warn!(reservation_id = %record.id, %err, "failed to mark record scheduled");
                }
            }
        }

        let hydrated = hydrate_batch(&batch, self.directory.as_ref()).await;
        for failure in &hydrated.failures {
            warn!(reservation_id = %failure.reservation_id, error = %failure.error, "could not hydrate reservation");
            let _ = self
                .store
                .update_status(&failure.reservation_id, ReservationStatus::Failed, Some("could not prepare request".to_string()))
                .await;
        }

        if hydrated.requests.is_empty() {
            return;
        }

        let available_courts = self.health_gate.ensure_ready().await;
        if available_courts.is_empty() {
            warn!(
                target_date = %batch.target_date,
                target_time = %batch.target_time,
                "no courts available, leaving batch scheduled for the next tick"
            );
            return;
        }

        let records: Vec<_> = hydrated.requests.iter().map(|(record, _)| record.clone()).collect();
        let request_by_id: HashMap<String, BookingRequest> =
            hydrated.requests.into_iter().map(|(record, request)| (record.id, request)).collect();

        let plan = self.assignment.plan(&records, &available_courts);

        for (record, position) in &plan.waitlisted {
            if let Err(err) = self.store.bump_and_waitlist(&record.id, *position).await {
                warn!(reservation_id = %record.id, %err, "failed to move record to waitlist");
                continue;
            }
            self.dispatcher.dispatch_waitlisted(&record.user.user_id, *position).await;
        }

        let mut jobs = Vec::with_capacity(plan.browser_assignments.len());
        for assignment in plan.browser_assignments {
            let reservation_id = assignment.attempt.reservation_id.clone();
            let Some(request) = request_by_id.get(&reservation_id).cloned() else { continue };
            if let Err(err) = self.store.update_status(&reservation_id, ReservationStatus::BookingInProgress, None).await {
                warn!(reservation_id = %reservation_id, %err, "failed to mark record booking-in-progress");
                continue;
            }
            jobs.push(DispatchJob { assignment, request });
        }

        if jobs.is_empty() {
            return;
        }

        let window_open = shared_utils::window_open(
            self.settings.timezone,
            batch.target_date,
            &batch.target_time,
            self.settings.booking_window_hours,
        )
        .unwrap_or(now);
        let target_play_time =
            shared_utils::target_datetime_utc(self.settings.timezone, batch.target_date, &batch.target_time)
                .unwrap_or(now);
        let timeout = Duration::from_secs(self.settings.dispatch_timeout_seconds());

        // critical_operation gates background pool maintenance out for the
        // duration of the dispatch; always cleared on the way out (spec.md
        // §5, Design Notes §9).
        self.pool.set_critical_operation(true);
        let results = dispatch_batch(
            self.executor.clone(),
            self.pool.clone(),
            jobs,
            self.base_schedule_urls.clone(),
            window_open,
            target_play_time,
            timeout,
        )
        .await;
        self.pool.set_critical_operation(false);

        for (reservation_id, result) in results {
            if let Err(err) = self.store.complete_booking(&reservation_id, &result).await {
                warn!(reservation_id = %reservation_id, %err, "failed to persist booking outcome");
            } else if !result.is_success() {
                self.handle_failed_outcome(reservation_id.clone());
            }

            if let Some(record) = records.iter().find(|r| r.id == reservation_id) {
                self.dispatcher.dispatch_result(&record.user.user_id, &result).await;
            }
        }
    }

    /// A FAILED record is terminal in production: removed from the queue
    /// entirely (spec.md §4.J "remove from queue unless retention is
    /// configured"). Under `test_mode.retain_failed_reservations`, it is
    /// instead reset to SCHEDULED after a fixed delay so the next tick
    /// retries it (spec.md §3: "FAILED ... in a configurable test mode it
    /// returns to SCHEDULED after a fixed delay for retry").
    fn handle_failed_outcome(&self, reservation_id: String) {
        if self.settings.test_mode.enabled && self.settings.test_mode.retain_failed_reservations {
            let store = self.store.clone();
            let delay = self.failed_retry_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(err) = store.update_status(&reservation_id, ReservationStatus::Scheduled, None).await {
                    warn!(reservation_id = %reservation_id, %err, "failed to reset failed record to scheduled for test-mode retry");
                }
            });
        } else {
            let store = self.store.clone();
            tokio::spawn(async move {
                if let Err(err) = store.remove(&reservation_id).await {
                    warn!(reservation_id = %reservation_id, %err, "failed to remove terminal failed record from queue");
                }
            });
        }
    }
}

/// Fixed retry delay applied to test-mode failure retention (spec.md §3).
const FAILED_RETRY_DELAY: Duration = Duration::from_secs(30);
