use notifier_cell::NotificationDispatcher;
use reservation_queue_cell::Store;
use shared_models::ReservationRecord;

use crate::error::SchedulerError;

/// Cancels `reservation_id` and, if a waitlist exists for its slot, promotes
/// the first record in line — shifting the remaining positions down by one.
/// Ported from the original's `handle_cancellation` (spec.md §4.I
/// cancellation promotion rule).
pub async fn handle_cancellation(
    store: &Store,
    dispatcher: &NotificationDispatcher,
    reservation_id: &str,
) -> Result<Option<ReservationRecord>, SchedulerError> {
    let record = store.cancel(reservation_id).await?;
    let promoted = promote_next_in_waitlist(store, record.target_date, &record.target_time).await?;

    if let Some(promoted) = &promoted {
        dispatcher.dispatch_promoted(&promoted.user.user_id).await;
    }

    Ok(promoted)
}

async fn promote_next_in_waitlist(
    store: &Store,
    target_date: chrono::NaiveDate,
    target_time: &str,
) -> Result<Option<ReservationRecord>, SchedulerError> {
    let waitlist = store.list_waitlisted_for(target_date, target_time).await;
    let Some(first) = waitlist.first() else {
        return Ok(None);
    };

    let promoted = store.promote_waitlisted(&first.id).await?;
    store.shift_waitlist_positions(target_date, target_time).await?;
    Ok(Some(promoted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use notifier_cell::Notifier;
    use shared_config::{Settings, TestModeConfig};
    use shared_models::{BookingRequest, BookingSource, BookingUser, CourtPreference, ReservationStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn settings() -> Settings {
        Settings {
            timezone: chrono_tz::America::Guatemala,
            courts: vec![1, 2, 3],
            booking_window_hours: 48,
            poll_interval_seconds: 15,
            max_retries: 10,
            attempt_budget_seconds: 85,
            recovery_timeout_seconds: 60,
            max_recovery_attempts: 3,
            production_mode: false,
            test_mode: TestModeConfig { enabled: true, trigger_delay_minutes: 1, retain_failed_reservations: true },
        }
    }

    fn request(user_id: &str) -> BookingRequest {
        BookingRequest {
            request_id: Some(format!("req-{user_id}")),
            source: BookingSource::Queued,
            user: BookingUser {
                user_id: user_id.into(),
                first_name: "Test".into(),
                last_name: "User".into(),
                email: "t@example.com".into(),
                phone: "555".into(),
                tier: None,
            },
            target_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            target_time: "10:00".into(),
            court_preference: CourtPreference::single(1),
            created_at: Utc::now(),
            metadata: std::collections::HashMap::new(),
            executor_config: None,
        }
    }

    struct NullNotifier {
        resends: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Notifier for NullNotifier {
        async fn send(&self, _payload: notifier_cell::NotificationPayload) {}
        async fn resend_menu(&self, _user_id: &str) {
            self.resends.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn cancelling_a_confirmed_slot_promotes_the_first_waitlisted_and_shifts_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path().join("queue.json")).await;
        let settings = settings();

        let confirmed = store.add(request("holder"), &settings).await.unwrap();
        let first = store.add(request("first-in-line"), &settings).await.unwrap();
        let second = store.add(request("second-in-line"), &settings).await.unwrap();

        for record in [&confirmed, &first, &second] {
            store.update_status(&record.id, ReservationStatus::Scheduled, None).await.unwrap();
        }
        store.bump_and_waitlist(&first.id, 1).await.unwrap();
        store.bump_and_waitlist(&second.id, 2).await.unwrap();

        let notifier = Arc::new(NullNotifier { resends: AtomicUsize::new(0) });
        let dispatcher = NotificationDispatcher::new(notifier);

        let promoted = handle_cancellation(&store, &dispatcher, &confirmed.id).await.unwrap().unwrap();
        assert_eq!(promoted.id, first.id);
        assert_eq!(promoted.status, ReservationStatus::Confirmed);

        let remaining = store.list_waitlisted_for(confirmed.target_date, &confirmed.target_time).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
        assert_eq!(remaining[0].waitlist_position, Some(1));

        let cancelled = store.get(&confirmed.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_with_no_waitlist_promotes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path().join("queue.json")).await;
        let settings = settings();

        let record = store.add(request("solo"), &settings).await.unwrap();
        let notifier = Arc::new(NullNotifier { resends: AtomicUsize::new(0) });
        let dispatcher = NotificationDispatcher::new(notifier);

        let promoted = handle_cancellation(&store, &dispatcher, &record.id).await.unwrap();
        assert!(promoted.is_none());
    }
}
