use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use shared_models::{HealthReport, ReservationStatus};

/// Response body for `GET /health`: the pool's per-court health report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub report: HealthReport,
}

/// Response body for `GET /metrics`: recovery history and a snapshot of the
/// reservation queue broken down by status.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub queue_by_status: HashMap<String, usize>,
    pub recovery: recovery_cell::RecoveryStats,
}

/// Response body for `GET /availability`: per-court available times grouped
/// by ISO date, as extracted by the availability checker (spec.md §4.C).
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub courts: HashMap<u32, HashMap<String, Vec<String>>>,
}

impl AvailabilityResponse {
    pub fn from_courts(by_court: HashMap<u32, HashMap<NaiveDate, Vec<String>>>) -> Self {
        let courts = by_court
            .into_iter()
            .map(|(court, by_date)| {
                let by_date = by_date.into_iter().map(|(date, times)| (date.to_string(), times)).collect();
                (court, by_date)
            })
            .collect();
        Self { courts }
    }
}

pub fn status_label(status: ReservationStatus) -> &'static str {
    match status {
        ReservationStatus::Pending => "pending",
        ReservationStatus::Scheduled => "scheduled",
        ReservationStatus::BookingInProgress => "booking_in_progress",
        ReservationStatus::Waitlisted => "waitlisted",
        ReservationStatus::Confirmed => "confirmed",
        ReservationStatus::Bumped => "bumped",
        ReservationStatus::Success => "success",
        ReservationStatus::Failed => "failed",
        ReservationStatus::Cancelled => "cancelled",
        ReservationStatus::Expired => "expired",
    }
}
