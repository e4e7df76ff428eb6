use chrono::NaiveDate;
use shared_models::ReservationRecord;

use crate::error::QueueError;

/// A user may hold at most one active (pending/scheduled/in-progress)
/// reservation for a given date+time. Ported from the original's
/// `ensure_unique_slot` helper rather than folded into the store, so the
/// rule stays testable in isolation from persistence.
pub fn ensure_unique_slot(
    existing: &[ReservationRecord],
    user_id: &str,
    target_date: NaiveDate,
    target_time: &str,
) -> Result<(), QueueError> {
    let clashes = existing.iter().any(|r| {
        r.status.is_active()
            && r.user.user_id == user_id
            && r.target_date == target_date
            && r.target_time == target_time
    });

    if clashes {
        return Err(QueueError::DuplicateSlot {
            target_date: target_date.to_string(),
            target_time: target_time.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_models::{BookingSource, BookingUser, CourtPreference, ReservationStatus};
    use std::collections::HashMap;

    fn record(user_id: &str, date: NaiveDate, time: &str, status: ReservationStatus) -> ReservationRecord {
        ReservationRecord {
            id: ReservationRecord::new_id(),
            user: BookingUser {
                user_id: user_id.to_string(),
                first_name: "Test".into(),
                last_name: "User".into(),
                email: "t@example.com".into(),
                phone: "555-0100".into(),
                tier: None,
            },
            target_date: date,
            target_time: time.to_string(),
            court_preference: CourtPreference::single(1),
            source: BookingSource::Immediate,
            created_at: Utc::now(),
            metadata: HashMap::new(),
            executor_config: None,
            status,
            scheduled_execution: Utc::now(),
            attempts: 0,
            last_error: None,
            confirmation_code: None,
            confirmation_url: None,
            calendar_links: HashMap::new(),
            waitlist_position: None,
            priority: 0,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn rejects_duplicate_active_slot() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let existing = vec![record("u1", date, "10:00", ReservationStatus::Scheduled)];
        let result = ensure_unique_slot(&existing, "u1", date, "10:00");
        assert!(matches!(result, Err(QueueError::DuplicateSlot { .. })));
    }

    #[test]
    fn allows_same_slot_once_prior_is_terminal() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let existing = vec![record("u1", date, "10:00", ReservationStatus::Cancelled)];
        assert!(ensure_unique_slot(&existing, "u1", date, "10:00").is_ok());
    }

    #[test]
    fn allows_different_user_same_slot() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let existing = vec![record("u1", date, "10:00", ReservationStatus::Pending)];
        assert!(ensure_unique_slot(&existing, "u2", date, "10:00").is_ok());
    }
}
