use thiserror::Error;

/// Errors the scheduler surfaces to its own caller (the process entrypoint
/// and the cancellation API). Per-record failures never reach this type —
/// they're recorded on the record itself (spec.md §7).
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Queue(#[from] reservation_queue_cell::QueueError),
}
