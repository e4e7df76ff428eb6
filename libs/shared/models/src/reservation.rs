use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::contracts::{BookingSource, BookingUser, CourtPreference};

/// Status lifecycle of a [`ReservationRecord`], per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Scheduled,
    BookingInProgress,
    Success,
    Failed,
    Bumped,
    Waitlisted,
    Confirmed,
    Expired,
    Cancelled,
}

impl ReservationStatus {
    /// SUCCESS, CANCELLED, EXPIRED never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReservationStatus::Success | ReservationStatus::Cancelled | ReservationStatus::Expired
        )
    }

    /// A record is "active" for the uniqueness invariant while it can still
    /// result in a booking.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending
                | ReservationStatus::Scheduled
                | ReservationStatus::BookingInProgress
        )
    }

    /// Whether `self -> target` is a legal transition per the state diagram
    /// in spec.md §3. Terminal states never transition.
    pub fn can_transition_to(self, target: ReservationStatus) -> bool {
        use ReservationStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, target),
            (Pending, Scheduled)
                | (Pending, Cancelled)
                | (Scheduled, BookingInProgress)
                | (Scheduled, Cancelled)
                | (Scheduled, Bumped)
                | (BookingInProgress, Success)
                | (BookingInProgress, Failed)
                | (BookingInProgress, Bumped)
                | (Waitlisted, Confirmed)
                | (Waitlisted, Expired)
                | (Waitlisted, Cancelled)
                | (Confirmed, BookingInProgress)
                | (Confirmed, Cancelled)
                | (Bumped, Waitlisted)
                | (_, Failed)
                | (Failed, Scheduled) // test-mode retry after fixed delay
        )
    }
}

/// Durable queue entry: a [`crate::contracts::BookingRequest`] plus queue
/// bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: String,
    pub user: BookingUser,
    pub target_date: NaiveDate,
    pub target_time: String,
    pub court_preference: CourtPreference,
    pub source: BookingSource,
    pub created_at: DateTime<Utc>,
    pub metadata: HashMap<String, Value>,
    pub executor_config: Option<HashMap<String, Value>>,

    pub status: ReservationStatus,
    pub scheduled_execution: DateTime<Utc>,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub confirmation_code: Option<String>,
    pub confirmation_url: Option<String>,
    pub calendar_links: HashMap<String, String>,
    pub waitlist_position: Option<u32>,
    pub priority: u8,

    /// Fields from the on-disk document that this version doesn't know
    /// about. Kept and re-emitted unchanged so an older or newer writer
    /// sharing the same queue file doesn't lose data on round-trip
    /// (spec.md §6: "preserve unknown fields on round-trip").
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ReservationRecord {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Uniqueness key: a user may hold at most one active record per slot.
    pub fn slot_key(&self) -> (String, NaiveDate, String) {
        (self.user.user_id.clone(), self.target_date, self.target_time.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_never_transition() {
        assert!(!ReservationStatus::Success.can_transition_to(ReservationStatus::Scheduled));
        assert!(!ReservationStatus::Cancelled.can_transition_to(ReservationStatus::Pending));
        assert!(!ReservationStatus::Expired.can_transition_to(ReservationStatus::Confirmed));
    }

    #[test]
    fn waitlist_promotion_is_legal() {
        assert!(ReservationStatus::Waitlisted.can_transition_to(ReservationStatus::Confirmed));
        assert!(ReservationStatus::Confirmed.can_transition_to(ReservationStatus::BookingInProgress));
    }

    #[test]
    fn any_active_state_can_fail() {
        assert!(ReservationStatus::BookingInProgress.can_transition_to(ReservationStatus::Failed));
        assert!(ReservationStatus::Scheduled.can_transition_to(ReservationStatus::Failed));
    }
}
