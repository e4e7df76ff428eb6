use std::sync::Arc;
use std::time::Duration;

use browser_pool_cell::{NavigationWait, Page};
use chrono::{DateTime, Utc};
use form_service_cell::{FormError, FormService, SubmitOutcome};
use shared_models::{BookingRequest, BookingResult};
use tracing::{info, warn};

use crate::error::ExecutorError;
use crate::navigation::{await_form_ready, navigate_progressively};
use crate::retry::RetryPolicy;
use crate::selectors::TIME_BUTTON_TAG;
use crate::state::ExecutorState;

const AWAIT_FORM_BUDGET: Duration = Duration::from_secs(30);
const PRE_WINDOW_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Per-attempt booking state machine (spec.md §4.D) plus the bounded retry
/// engine that operates inside one attempt (spec.md §4.K).
pub struct BookingExecutor {
    form_service: FormService,
    retry_policy: RetryPolicy,
    attempt_budget: Duration,
}

impl BookingExecutor {
    pub fn new(max_retries: u32, attempt_budget: Duration) -> Self {
        Self {
            form_service: FormService::new(),
            retry_policy: RetryPolicy::new(max_retries),
            attempt_budget,
        }
    }

    /// Runs one full attempt against `page`, which must already be the
    /// session assigned to `court` by the Assignment Orchestrator. Always
    /// returns a [`BookingResult`]; no error escapes (spec.md §7
    /// "Propagation policy").
    pub async fn run(
        &self,
        page: Arc<dyn Page>,
        request: &BookingRequest,
        base_schedule_url: &str,
        court: u32,
        window_open: DateTime<Utc>,
        target_play_time: DateTime<Utc>,
    ) -> BookingResult {
        let started_at = Utc::now();

        let outcome = tokio::time::timeout(
            self.attempt_budget,
            self.drive(page.clone(), request, base_schedule_url, window_open, target_play_time),
        )
        .await;

        // Post-attempt cleanup: always return to the base schedule URL,
        // best-effort (spec.md §4.D).
        if let Err(err) = page.goto(base_schedule_url, NavigationWait::DomContentLoaded).await {
            warn!(court, %err, "post-attempt cleanup navigation failed");
        }

        let completed_at = Utc::now();

        match outcome {
            Ok(Ok(submit_outcome)) => {
                self.result_from_outcome(request, court, submit_outcome, started_at, completed_at)
            }
            Ok(Err(err)) => self.result_from_error(request, err, started_at, completed_at),
            Err(_) => self.result_from_error(request, ExecutorError::WallBudgetExceeded, started_at, completed_at),
        }
    }

    async fn drive(
        &self,
        page: Arc<dyn Page>,
        request: &BookingRequest,
        base_schedule_url: &str,
        window_open: DateTime<Utc>,
        target_play_time: DateTime<Utc>,
    ) -> Result<SubmitOutcome, ExecutorError> {
        let mut state = ExecutorState::PreWindowWait;
        let mut attempts: u32 = 0;

        loop {
            state = match state {
                ExecutorState::PreWindowWait => {
                    self.pre_window_wait(&page, base_schedule_url, &request.target_time, window_open).await?;
                    ExecutorState::FindSlot
                }
                ExecutorState::FindSlot => {
                    self.find_slot(&page, base_schedule_url, &request.target_time, target_play_time, &mut attempts)
                        .await?;
                    ExecutorState::ClickSlot
                }
                ExecutorState::ClickSlot => {
                    if !page.click_matching_text("button", &request.target_time).await? {
                        return Err(ExecutorError::SlotUnavailable);
                    }
                    ExecutorState::AwaitForm
                }
                ExecutorState::AwaitForm => {
                    if !await_form_ready(&page, AWAIT_FORM_BUDGET).await? {
                        return Err(ExecutorError::SlotUnavailable);
                    }
                    ExecutorState::FillAndSubmit
                }
                ExecutorState::FillAndSubmit => {
                    let outcome = self.form_service.fill_and_submit(&page, &request.user).await;
                    return match outcome {
                        Ok(outcome) => Ok(outcome),
                        Err(FormError::BotDetected) => Err(ExecutorError::BotDetected),
                        Err(FormError::ValidationFailed(msg)) => {
                            Err(ExecutorError::ValidationFailed(vec![msg]))
                        }
                        Err(FormError::MissingFields(fields)) => Err(ExecutorError::ValidationFailed(fields)),
                        Err(other) => Err(ExecutorError::Form(other)),
                    };
                }
                ExecutorState::Done => unreachable!("Done is a terminal marker, never entered"),
            };
        }
    }

    /// Polls every ~0.5s before the window opens. If the slot appears
    /// early, the handle is kept (no further navigation) and we sleep out
    /// the remainder, then hand control back to click it the instant the
    /// window opens (spec.md §4.D Window-open contract, ±1s tolerance).
    async fn pre_window_wait(
        &self,
        page: &Arc<dyn Page>,
        base_schedule_url: &str,
        target_time: &str,
        window_open: DateTime<Utc>,
    ) -> Result<(), ExecutorError> {
        loop {
            let now = Utc::now();
            if now >= window_open {
                return Ok(());
            }
            let remaining = (window_open - now).to_std().unwrap_or(Duration::ZERO);

            if self.probe_slot_present(page, target_time).await? {
                info!(target_time, "slot appeared early in pre-window, holding until window opens");
                tokio::time::sleep(remaining).await;
                return Ok(());
            }

            if let Err(err) = page.goto(base_schedule_url, NavigationWait::DomContentLoaded).await {
                warn!(%err, "pre-window refresh failed, retrying");
            }
            tokio::time::sleep(remaining.min(PRE_WINDOW_POLL_INTERVAL)).await;
        }
    }

    /// Post-window bounded retry loop: refreshes and re-probes until the
    /// slot is found or `max_retries` is exhausted (spec.md §4.K).
    async fn find_slot(
        &self,
        page: &Arc<dyn Page>,
        base_schedule_url: &str,
        target_time: &str,
        target_play_time: DateTime<Utc>,
        attempts: &mut u32,
    ) -> Result<(), ExecutorError> {
        loop {
            if self.probe_slot_present(page, target_time).await? {
                return Ok(());
            }

            *attempts += 1;
            if *attempts > self.retry_policy.max_retries {
                return Err(ExecutorError::SlotNotFound);
            }

            let delay = self.retry_policy.delay_before_retry(Utc::now(), target_play_time);
            tokio::time::sleep(delay).await;

            if let Err(err) = page.goto(base_schedule_url, NavigationWait::DomContentLoaded).await {
                warn!(%err, attempts, "find-slot refresh failed, retrying");
            }
        }
    }

    async fn probe_slot_present(&self, page: &Arc<dyn Page>, target_time: &str) -> Result<bool, ExecutorError> {
        let texts = page.find_all_text(TIME_BUTTON_TAG).await?;
        Ok(texts.iter().any(|t| t.trim() == target_time))
    }

    fn result_from_outcome(
        &self,
        request: &BookingRequest,
        court: u32,
        outcome: SubmitOutcome,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> BookingResult {
        match outcome {
            SubmitOutcome::Success { confirmation_id, message } => BookingResult::success(
                request.user.clone(),
                request.request_id.clone(),
                court,
                request.target_time.clone(),
                confirmation_id,
                None,
                Some(message),
                Some(request.metadata.clone()),
                Some(started_at),
                Some(completed_at),
            ),
            SubmitOutcome::BotDetected { message } => BookingResult::failure(
                request.user.clone(),
                request.request_id.clone(),
                Some(format!("{message} - please book manually on the venue site")),
                vec![message],
                Some(request.metadata.clone()),
                Some(started_at),
                Some(completed_at),
            ),
            SubmitOutcome::ValidationError { messages } => BookingResult::failure(
                request.user.clone(),
                request.request_id.clone(),
                Some("form validation failed".to_string()),
                messages,
                Some(request.metadata.clone()),
                Some(started_at),
                Some(completed_at),
            ),
            SubmitOutcome::Unknown { message } => BookingResult::failure(
                request.user.clone(),
                request.request_id.clone(),
                Some(message.clone()),
                vec![message],
                Some(request.metadata.clone()),
                Some(started_at),
                Some(completed_at),
            ),
        }
    }

    fn result_from_error(
        &self,
        request: &BookingRequest,
        error: ExecutorError,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> BookingResult {
        let message = match &error {
            ExecutorError::WallBudgetExceeded => {
                format!("Booking timed out after {} seconds", self.attempt_budget.as_secs())
            }
            ExecutorError::SlotUnavailable => "slot is not available - someone else took it".to_string(),
            ExecutorError::SlotNotFound => "time slot not available after retries".to_string(),
            ExecutorError::BotDetected => {
                "bot detection triggered - please book manually on the venue site".to_string()
            }
            other => other.to_string(),
        };

        BookingResult::failure(
            request.user.clone(),
            request.request_id.clone(),
            Some(message.clone()),
            vec![message],
            Some(request.metadata.clone()),
            Some(started_at),
            Some(completed_at),
        )
    }
}
