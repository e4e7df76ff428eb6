use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContractError;

/// Which subsystem originated a [`BookingRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Immediate,
    Queued,
    Admin,
    Retry,
}

/// Non-empty ordered list of preferred courts: one primary, zero or more
/// fallbacks. Ordering is respected; deduplication is not required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtPreference {
    pub primary: u32,
    pub fallbacks: Vec<u32>,
}

impl CourtPreference {
    pub fn single(court: u32) -> Self {
        Self { primary: court, fallbacks: Vec::new() }
    }

    pub fn from_sequence(courts: &[u32]) -> Result<Self, ContractError> {
        let mut iter = courts.iter().copied();
        let primary = iter.next().ok_or(ContractError::EmptyCourtPreference)?;
        Ok(Self { primary, fallbacks: iter.collect() })
    }

    /// Courts in priority order: primary first, then fallbacks.
    pub fn as_list(&self) -> Vec<u32> {
        let mut list = Vec::with_capacity(1 + self.fallbacks.len());
        list.push(self.primary);
        list.extend_from_slice(&self.fallbacks);
        list
    }
}

/// Identity and form-fill values for a member. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tier: Option<String>,
}

impl BookingUser {
    /// Priority derived from tier when not explicitly stored on a record:
    /// admin = 0, VIP = 1, regular = 2. Lower is higher priority.
    pub fn tier_priority(&self) -> u8 {
        match self.tier.as_deref() {
            Some("admin") => 0,
            Some("vip") => 1,
            _ => 2,
        }
    }
}

fn is_valid_target_time(time: &str) -> bool {
    let mut parts = time.split(':');
    let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    matches!((h.parse::<u32>(), m.parse::<u32>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
        && h.len() == 2
        && m.len() == 2
}

/// Canonical input to the booking executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub request_id: Option<String>,
    pub source: BookingSource,
    pub user: BookingUser,
    pub target_date: NaiveDate,
    pub target_time: String,
    pub court_preference: CourtPreference,
    pub created_at: DateTime<Utc>,
    pub metadata: HashMap<String, Value>,
    pub executor_config: Option<HashMap<String, Value>>,
}

impl BookingRequest {
    pub fn preferred_courts(&self) -> Vec<u32> {
        self.court_preference.as_list()
    }

    /// Build a request for immediate bookings triggered directly by a user,
    /// bypassing the queue (source = immediate, no request id).
    pub fn from_immediate_payload(
        user: BookingUser,
        target_date: NaiveDate,
        target_time: impl Into<String>,
        court: u32,
        metadata: Option<HashMap<String, Value>>,
        executor_config: Option<HashMap<String, Value>>,
    ) -> Result<Self, ContractError> {
        let target_time = target_time.into();
        if !is_valid_target_time(&target_time) {
            return Err(ContractError::InvalidTargetTime(target_time));
        }
        Ok(Self {
            request_id: None,
            source: BookingSource::Immediate,
            user,
            target_date,
            target_time,
            court_preference: CourtPreference::single(court),
            created_at: Utc::now(),
            metadata: metadata.unwrap_or_default(),
            executor_config,
        })
    }

    /// Build a request from a durable queue entry.
    pub fn from_reservation_record(
        request_id: impl Into<String>,
        user: BookingUser,
        target_date: NaiveDate,
        target_time: impl Into<String>,
        courts: &[u32],
        source: BookingSource,
        metadata: Option<HashMap<String, Value>>,
        executor_config: Option<HashMap<String, Value>>,
    ) -> Result<Self, ContractError> {
        let target_time = target_time.into();
        if !is_valid_target_time(&target_time) {
            return Err(ContractError::InvalidTargetTime(target_time));
        }
        let court_preference = CourtPreference::from_sequence(courts)?;
        Ok(Self {
            request_id: Some(request_id.into()),
            source,
            user,
            target_date,
            target_time,
            court_preference,
            created_at: Utc::now(),
            metadata: metadata.unwrap_or_default(),
            executor_config,
        })
    }
}

/// Builds the `{source, target_date, target_time, ...extras}` metadata map
/// attached to reservations and notifications.
pub fn compose_metadata(
    source: BookingSource,
    target_date: NaiveDate,
    target_time: &str,
    extras: Option<HashMap<String, Value>>,
) -> HashMap<String, Value> {
    let mut metadata = extras.unwrap_or_default();
    metadata.insert("source".into(), Value::String(format!("{source:?}").to_lowercase()));
    metadata.insert("target_date".into(), Value::String(target_date.to_string()));
    metadata.insert("target_time".into(), Value::String(target_time.to_string()));
    metadata
}

/// Overall result of a booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Success,
    Failure,
    Partial,
}

/// Canonical output of the booking executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResult {
    pub status: BookingStatus,
    pub user: BookingUser,
    pub request_id: Option<String>,
    pub court_reserved: Option<u32>,
    pub time_reserved: Option<String>,
    pub confirmation_code: Option<String>,
    pub confirmation_url: Option<String>,
    pub message: Option<String>,
    pub errors: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, Value>,
}

impl BookingResult {
    pub fn is_success(&self) -> bool {
        self.status == BookingStatus::Success
    }

    #[allow(clippy::too_many_arguments)]
    pub fn success(
        user: BookingUser,
        request_id: Option<String>,
        court_reserved: u32,
        time_reserved: impl Into<String>,
        confirmation_code: Option<String>,
        confirmation_url: Option<String>,
        message: Option<String>,
        metadata: Option<HashMap<String, Value>>,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status: BookingStatus::Success,
            user,
            request_id,
            court_reserved: Some(court_reserved),
            time_reserved: Some(time_reserved.into()),
            confirmation_code,
            confirmation_url,
            message,
            errors: Vec::new(),
            started_at,
            completed_at,
            metadata: metadata.unwrap_or_default(),
        }
    }

    pub fn failure(
        user: BookingUser,
        request_id: Option<String>,
        message: Option<String>,
        errors: Vec<String>,
        metadata: Option<HashMap<String, Value>>,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status: BookingStatus::Failure,
            user,
            request_id,
            court_reserved: None,
            time_reserved: None,
            confirmation_code: None,
            confirmation_url: None,
            message,
            errors,
            started_at,
            completed_at,
            metadata: metadata.unwrap_or_default(),
        }
    }

    /// Returns a new result with `extra` merged into metadata. Results are
    /// immutable — merging never mutates `self`.
    pub fn merge_metadata(&self, extra: HashMap<String, Value>) -> Self {
        let mut merged = self.metadata.clone();
        merged.extend(extra);
        Self { metadata: merged, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> BookingUser {
        BookingUser {
            user_id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+50212345678".into(),
            tier: None,
        }
    }

    #[test]
    fn court_preference_from_sequence_rejects_empty() {
        assert_eq!(
            CourtPreference::from_sequence(&[]).unwrap_err(),
            ContractError::EmptyCourtPreference
        );
    }

    #[test]
    fn court_preference_preserves_order() {
        let pref = CourtPreference::from_sequence(&[2, 1, 3]).unwrap();
        assert_eq!(pref.as_list(), vec![2, 1, 3]);
    }

    #[test]
    fn immediate_payload_rejects_malformed_time() {
        let err = BookingRequest::from_immediate_payload(
            user(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            "8:00",
            1,
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ContractError::InvalidTargetTime("8:00".into()));
    }

    #[test]
    fn immediate_payload_has_no_request_id() {
        let req = BookingRequest::from_immediate_payload(
            user(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            "08:00",
            1,
            None,
            None,
        )
        .unwrap();
        assert!(req.request_id.is_none());
        assert_eq!(req.source, BookingSource::Immediate);
        assert_eq!(req.preferred_courts(), vec![1]);
    }

    #[test]
    fn merge_metadata_does_not_mutate_original() {
        let result = BookingResult::success(
            user(),
            None,
            1,
            "08:00",
            Some("ABC123".into()),
            None,
            None,
            None,
            None,
            None,
        );
        let mut extra = HashMap::new();
        extra.insert("execution_time_seconds".into(), Value::from(1.2));
        let merged = result.merge_metadata(extra);
        assert!(result.metadata.is_empty());
        assert_eq!(merged.metadata.len(), 1);
    }
}
