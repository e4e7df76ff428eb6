use serde::{Deserialize, Serialize};
use shared_models::BookingResult;

/// A button attached to a notification. URL buttons open a link directly
/// (calendar links); callback buttons round-trip an opaque action string
/// back through the chat layer (spec.md §6 "cancel_reservation:<id>").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineButton {
    Url { label: String, url: String },
    Callback { label: String, action: String },
}

impl InlineButton {
    pub fn cancel(request_id: &str) -> Self {
        Self::Callback {
            label: "Cancel".to_string(),
            action: format!("cancel_reservation:{request_id}"),
        }
    }
}

/// Structured payload handed to the chat layer. The core never speaks the
/// chat protocol directly (spec.md §6); this is the entire surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub user_id: String,
    pub message: String,
    pub parse_mode: ParseMode,
    pub inline_buttons: Vec<InlineButton>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Markdown,
    Plain,
}

/// Builds the final success/failure payload for a `BookingResult`, per
/// spec.md §4.J. Calendar links, if present in `result.metadata`, become
/// URL buttons; a cancellation callback button is always attached when a
/// `request_id` is available.
pub fn payload_for_result(user_id: &str, result: &BookingResult) -> NotificationPayload {
    if result.is_success() {
        success_payload(user_id, result)
    } else {
        failure_payload(user_id, result)
    }
}

fn success_payload(user_id: &str, result: &BookingResult) -> NotificationPayload {
    let mut message = String::from("Your reservation is confirmed!");
    if let (Some(court), Some(time)) = (result.court_reserved, result.time_reserved.as_deref()) {
        message.push_str(&format!(" Court {court} at {time}."));
    }
    if let Some(code) = &result.confirmation_code {
        message.push_str(&format!(" Confirmation: {code}."));
    }

    let mut buttons = Vec::new();
    if let Some(url) = result.metadata.get("google_calendar_url").and_then(|v| v.as_str()) {
        buttons.push(InlineButton::Url { label: "Add to Google Calendar".to_string(), url: url.to_string() });
    }
    if let Some(url) = result.metadata.get("ical_url").and_then(|v| v.as_str()) {
        buttons.push(InlineButton::Url { label: "Add to iCal".to_string(), url: url.to_string() });
    }
    if let Some(request_id) = &result.request_id {
        buttons.push(InlineButton::cancel(request_id));
    }

    NotificationPayload { user_id: user_id.to_string(), message, parse_mode: ParseMode::Markdown, inline_buttons: buttons }
}

fn failure_payload(user_id: &str, result: &BookingResult) -> NotificationPayload {
    let reason = result
        .message
        .clone()
        .or_else(|| result.errors.first().cloned())
        .unwrap_or_else(|| "Unknown error".to_string());

    NotificationPayload {
        user_id: user_id.to_string(),
        message: format!("We couldn't secure your reservation: {reason}"),
        parse_mode: ParseMode::Markdown,
        inline_buttons: Vec::new(),
    }
}

/// Advisory notification sent when a waitlisted record gets a position
/// (spec.md S4/S5 scenario behaviors) that does not replace the final
/// success/failure notification.
pub fn waitlist_payload(user_id: &str, position: u32) -> NotificationPayload {
    NotificationPayload {
        user_id: user_id.to_string(),
        message: format!("You're on the waitlist, position {position}. We'll notify you if a slot opens up."),
        parse_mode: ParseMode::Plain,
        inline_buttons: Vec::new(),
    }
}

pub fn promotion_payload(user_id: &str) -> NotificationPayload {
    NotificationPayload {
        user_id: user_id.to_string(),
        message: "A spot opened up — you've been promoted from the waitlist!".to_string(),
        parse_mode: ParseMode::Plain,
        inline_buttons: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::{BookingStatus, BookingUser};
    use std::collections::HashMap;

    fn user() -> BookingUser {
        BookingUser {
            user_id: "u1".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@example.com".into(),
            phone: "555".into(),
            tier: None,
        }
    }

    #[test]
    fn success_payload_includes_calendar_and_cancel_buttons() {
        let mut metadata = HashMap::new();
        metadata.insert("google_calendar_url".to_string(), serde_json::json!("https://cal.example/x"));
        let result = BookingResult {
            status: BookingStatus::Success,
            user: user(),
            request_id: Some("req-1".into()),
            court_reserved: Some(1),
            time_reserved: Some("10:00".into()),
            confirmation_code: Some("ABC123".into()),
            confirmation_url: None,
            message: None,
            errors: Vec::new(),
            started_at: None,
            completed_at: None,
            metadata,
        };
        let payload = payload_for_result("u1", &result);
        assert_eq!(payload.inline_buttons.len(), 2);
        assert!(payload.message.contains("ABC123"));
    }

    #[test]
    fn failure_payload_carries_reason() {
        let result = BookingResult {
            status: BookingStatus::Failure,
            user: user(),
            request_id: Some("req-1".into()),
            court_reserved: None,
            time_reserved: None,
            confirmation_code: None,
            confirmation_url: None,
            message: Some("slot not available".into()),
            errors: vec!["slot not available".into()],
            started_at: None,
            completed_at: None,
            metadata: HashMap::new(),
        };
        let payload = payload_for_result("u1", &result);
        assert!(payload.message.contains("slot not available"));
        assert!(payload.inline_buttons.is_empty());
    }
}
