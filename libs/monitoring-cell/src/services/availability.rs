use std::sync::Arc;

use availability_cell::AvailabilityChecker;

use crate::models::AvailabilityResponse;

/// Exposes the availability checker's per-court scan on the status surface
/// so an operator can see what the venue is currently showing without
/// waiting for the scheduler to hit a booking window.
pub struct AvailabilityService {
    checker: Arc<AvailabilityChecker>,
}

impl AvailabilityService {
    pub fn new(checker: Arc<AvailabilityChecker>) -> Self {
        Self { checker }
    }

    pub async fn snapshot(&self) -> AvailabilityResponse {
        let by_court = self.checker.check_all_courts().await;
        AvailabilityResponse::from_courts(by_court)
    }
}
