use thiserror::Error;

/// Errors surfaced to the caller on `add`/`update_status` (spec.md §7
/// "Validation error" taxonomy entry). IO failures are handled internally
/// per the store's failure semantics and never reach this type on reads.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("you already have a reservation for {target_date} at {target_time}")]
    DuplicateSlot { target_date: String, target_time: String },

    #[error("target_time '{0}' does not match HH:MM")]
    InvalidTargetTime(String),

    #[error("at least one court must be provided")]
    EmptyCourtPreference,

    #[error("no reservation found with id {0}")]
    NotFound(String),

    #[error("{from:?} cannot transition to {to:?} - {from:?} is terminal or the transition is illegal")]
    IllegalTransition { from: shared_models::ReservationStatus, to: shared_models::ReservationStatus },

    #[error("failed to persist queue store: {0}")]
    Persistence(#[source] anyhow::Error),
}
