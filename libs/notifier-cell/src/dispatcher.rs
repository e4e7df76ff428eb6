use std::sync::Arc;
use std::time::Duration;

use shared_models::BookingResult;

use crate::notifier::Notifier;
use crate::payload::{payload_for_result, promotion_payload, waitlist_payload};

/// Default delay before the chat layer is asked to resend its main-menu
/// affordance after a final notification (spec.md §4.J: "default 5-7 s").
const FOLLOWUP_DELAY: Duration = Duration::from_secs(6);

/// Fans a [`BookingResult`] or waitlist event out to the chat layer.
/// Notifications are fire-and-forget from the core's perspective: the
/// follow-up menu nudge runs on a detached task so a slow or unreachable
/// chat backend never blocks the scheduler loop.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    followup_delay: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier, followup_delay: FOLLOWUP_DELAY }
    }

    pub fn with_followup_delay(mut self, delay: Duration) -> Self {
        self.followup_delay = delay;
        self
    }

    /// Sends the one final notification a user receives for a reservation
    /// request (spec.md: "users always receive exactly one final
    /// notification per reservation request").
    pub async fn dispatch_result(&self, user_id: &str, result: &BookingResult) {
        let payload = payload_for_result(user_id, result);
        self.notifier.send(payload).await;
        self.schedule_followup(user_id);
    }

    /// Advisory notification; does not replace the eventual final one.
    pub async fn dispatch_waitlisted(&self, user_id: &str, position: u32) {
        self.notifier.send(waitlist_payload(user_id, position)).await;
    }

    /// Advisory notification for a waitlist promotion.
    pub async fn dispatch_promoted(&self, user_id: &str) {
        self.notifier.send(promotion_payload(user_id)).await;
        self.schedule_followup(user_id);
    }

    fn schedule_followup(&self, user_id: &str) {
        let notifier = Arc::clone(&self.notifier);
        let user_id = user_id.to_string();
        let delay = self.followup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.resend_menu(&user_id).await;
        });
    }
}
