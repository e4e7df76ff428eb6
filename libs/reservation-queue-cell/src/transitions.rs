use chrono::Utc;
use shared_models::{ReservationRecord, ReservationStatus};

use crate::error::QueueError;

/// Apply a status transition to `record` in place, rejecting transitions the
/// state diagram (spec.md §3) doesn't allow. Ported from the original's
/// `apply_status_update` as a free function rather than a `Store` method so
/// it stays unit-testable without a backing file.
pub fn apply_status_update(
    record: &mut ReservationRecord,
    new_status: ReservationStatus,
    error: Option<String>,
) -> Result<(), QueueError> {
    if !record.status.can_transition_to(new_status) {
        return Err(QueueError::IllegalTransition { from: record.status, to: new_status });
    }

    record.status = new_status;
    if new_status == ReservationStatus::Failed || new_status == ReservationStatus::BookingInProgress {
        record.attempts += 1;
    }
    if new_status == ReservationStatus::Failed {
        record.last_error = error;
    } else {
        record.last_error = None;
    }

    Ok(())
}

/// Move a record onto the waitlist at `position`, recording its prior queue
/// position in `extra.original_position` so a later promotion can report how
/// far the record climbed.
pub fn add_to_waitlist(record: &mut ReservationRecord, position: u32) -> Result<(), QueueError> {
    if !record.status.can_transition_to(ReservationStatus::Waitlisted) {
        return Err(QueueError::IllegalTransition { from: record.status, to: ReservationStatus::Waitlisted });
    }

    record.extra.insert(
        "original_position".to_string(),
        serde_json::Value::from(record.waitlist_position.unwrap_or(position)),
    );
    record.status = ReservationStatus::Waitlisted;
    record.waitlist_position = Some(position);
    Ok(())
}

/// Confirm a waitlisted record once a slot frees up: clears waitlist
/// bookkeeping and puts the record back in line for booking.
pub fn promote_from_waitlist(record: &mut ReservationRecord) -> Result<(), QueueError> {
    if !record.status.can_transition_to(ReservationStatus::Confirmed) {
        return Err(QueueError::IllegalTransition { from: record.status, to: ReservationStatus::Confirmed });
    }
    record.status = ReservationStatus::Confirmed;
    record.waitlist_position = None;
    Ok(())
}

/// Mark a still-pending/scheduled record as expired once its target time has
/// passed without a terminal outcome (spec.md §4.G self-heal on load).
pub fn expire_if_stale(record: &mut ReservationRecord) -> bool {
    if record.status.is_terminal() || record.status == ReservationStatus::Waitlisted {
        return false;
    }
    if record.scheduled_execution < Utc::now() - chrono::Duration::hours(6) {
        record.status = ReservationStatus::Expired;
        record.last_error = Some("expired: target time passed without a terminal outcome".to_string());
        return true;
    }
    false
}
