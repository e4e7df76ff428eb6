use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use shared_models::ReservationRecord;

/// Reservations sharing one `(target_date, target_time)` slot. Booking
/// attempts for a slot are dispatched together so the Assignment
/// Orchestrator can see every contender at once (spec.md §4.I).
#[derive(Debug, Clone)]
pub struct Batch {
    pub target_date: NaiveDate,
    pub target_time: String,
    pub records: Vec<ReservationRecord>,
}

/// The two buckets one poll tick splits pending records into (spec.md §4.H
/// step 3), ported from the original scheduler's `pull_ready_reservations`:
/// records whose window has already opened are ready to book; records
/// within six minutes of opening only need a health gate run ahead of time.
#[derive(Debug, Clone, Default)]
pub struct PipelineEvaluation {
    pub ready: Vec<Batch>,
    pub health_check: Vec<Batch>,
}

const HEALTH_CHECK_LOOKAHEAD_MINUTES: i64 = 6;

/// Buckets `pending` (the store's `list_pending()` output) relative to `now`.
pub fn evaluate_pending(pending: Vec<ReservationRecord>, now: DateTime<Utc>) -> PipelineEvaluation {
    let mut ready: HashMap<(NaiveDate, String), Vec<ReservationRecord>> = HashMap::new();
    let mut health_check: HashMap<(NaiveDate, String), Vec<ReservationRecord>> = HashMap::new();

    for record in pending {
        let key = (record.target_date, record.target_time.clone());
        if record.scheduled_execution <= now {
            ready.entry(key).or_default().push(record);
        } else if record.scheduled_execution - now <= Duration::minutes(HEALTH_CHECK_LOOKAHEAD_MINUTES) {
            health_check.entry(key).or_default().push(record);
        }
    }

    PipelineEvaluation { ready: into_batches(ready), health_check: into_batches(health_check) }
}

fn into_batches(grouped: HashMap<(NaiveDate, String), Vec<ReservationRecord>>) -> Vec<Batch> {
    grouped
        .into_iter()
        .map(|((target_date, target_time), records)| Batch { target_date, target_time, records })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::{BookingSource, BookingUser, CourtPreference, ReservationStatus};
    use std::collections::HashMap as Map;

    fn record(scheduled_execution: DateTime<Utc>) -> ReservationRecord {
        ReservationRecord {
            id: ReservationRecord::new_id(),
            user: BookingUser {
                user_id: "u1".into(),
                first_name: "Test".into(),
                last_name: "User".into(),
                email: "t@example.com".into(),
                phone: "555".into(),
                tier: None,
            },
            target_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            target_time: "08:00".into(),
            court_preference: CourtPreference::single(1),
            source: BookingSource::Queued,
            created_at: Utc::now(),
            metadata: Map::new(),
            executor_config: None,
            status: ReservationStatus::Scheduled,
            scheduled_execution,
            attempts: 0,
            last_error: None,
            confirmation_code: None,
            confirmation_url: None,
            calendar_links: Map::new(),
            waitlist_position: None,
            priority: 2,
            extra: Map::new(),
        }
    }

    #[test]
    fn past_due_records_are_ready() {
        let now = Utc::now();
        let evaluation = evaluate_pending(vec![record(now - Duration::seconds(1))], now);
        assert_eq!(evaluation.ready.len(), 1);
        assert!(evaluation.health_check.is_empty());
    }

    #[test]
    fn within_six_minutes_is_health_check_only() {
        let now = Utc::now();
        let evaluation = evaluate_pending(vec![record(now + Duration::minutes(5))], now);
        assert!(evaluation.ready.is_empty());
        assert_eq!(evaluation.health_check.len(), 1);
    }

    #[test]
    fn far_in_the_future_is_neither() {
        let now = Utc::now();
        let evaluation = evaluate_pending(vec![record(now + Duration::hours(2))], now);
        assert!(evaluation.ready.is_empty());
        assert!(evaluation.health_check.is_empty());
    }

    #[test]
    fn same_slot_records_share_a_batch() {
        let now = Utc::now();
        let evaluation = evaluate_pending(
            vec![record(now - Duration::seconds(1)), record(now - Duration::seconds(2))],
            now,
        );
        assert_eq!(evaluation.ready.len(), 1);
        assert_eq!(evaluation.ready[0].records.len(), 2);
    }
}
