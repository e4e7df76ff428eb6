use async_trait::async_trait;

use crate::payload::NotificationPayload;

/// The chat layer, injected. The core never speaks the chat protocol
/// directly (spec.md §6); this is the entire outbound surface it needs.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: NotificationPayload);

    /// Asks the chat layer to resend a main-menu affordance, a short delay
    /// after the primary notification (spec.md §4.J follow-up nudge).
    async fn resend_menu(&self, user_id: &str);
}

/// Default production implementation: logs instead of calling out to a real
/// chat backend, since the chat bot itself is out of scope (spec.md §2
/// Non-goals). Swapping in a real implementation only requires this trait.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, payload: NotificationPayload) {
        tracing::info!(
            user_id = %payload.user_id,
            buttons = payload.inline_buttons.len(),
            "{}",
            payload.message
        );
    }

    async fn resend_menu(&self, user_id: &str) {
        tracing::debug!(user_id, "resending main-menu affordance");
    }
}
