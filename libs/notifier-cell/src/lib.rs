pub mod dispatcher;
pub mod notifier;
pub mod payload;

pub use dispatcher::NotificationDispatcher;
pub use notifier::{LoggingNotifier, Notifier};
pub use payload::{payload_for_result, promotion_payload, waitlist_payload, InlineButton, NotificationPayload, ParseMode};
