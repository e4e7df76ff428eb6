use thiserror::Error;

/// Errors raised while running one booking attempt. Every variant maps to a
/// failure classification in spec.md §7; the executor itself never lets a
/// raw error escape — [`crate::executor::BookingExecutor::run`] always
/// converts these into a [`shared_models::BookingResult`].
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("page interaction failed: {0}")]
    Page(#[from] browser_pool_cell::PoolError),

    #[error("form interaction failed: {0}")]
    Form(#[from] form_service_cell::FormError),

    #[error("time slot was not found before the retry budget was exhausted")]
    SlotNotFound,

    #[error("slot unavailable - form never appeared, another booker likely took it")]
    SlotUnavailable,

    #[error("bot detection triggered on venue site")]
    BotDetected,

    #[error("form validation failed: {0:?}")]
    ValidationFailed(Vec<String>),

    #[error("attempt exceeded its wall-clock budget")]
    WallBudgetExceeded,
}

impl ExecutorError {
    /// Whether this class of failure is worth retrying within the same
    /// attempt (spec.md §4.K "Non-retryable errors").
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ExecutorError::BotDetected
                | ExecutorError::SlotUnavailable
                | ExecutorError::ValidationFailed(_)
        )
    }
}
