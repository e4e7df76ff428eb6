use shared_models::{compose_metadata, BookingRequest, ReservationRecord};

use crate::batch::Batch;
use crate::user_directory::UserDirectory;

/// A record whose `BookingRequest` could not be built. Reported separately
/// so one bad record never blocks the rest of the batch (spec.md §4.H step
/// 5.a, ported from the original's `HydrationFailure`).
#[derive(Debug, Clone)]
pub struct HydrationFailure {
    pub reservation_id: String,
    pub error: String,
}

/// Result of turning a [`Batch`] of durable records into executor-ready
/// requests.
#[derive(Debug, Clone, Default)]
pub struct HydratedBatch {
    pub requests: Vec<(ReservationRecord, BookingRequest)>,
    pub failures: Vec<HydrationFailure>,
}

/// Builds one [`BookingRequest`] per record in `batch`, refreshing the
/// member profile through `directory` first. A record that fails to hydrate
/// (malformed preference list, invalid time) is reported as a failure and
/// excluded from the requests list rather than aborting the whole batch.
pub async fn hydrate_batch(batch: &Batch, directory: &dyn UserDirectory) -> HydratedBatch {
    let mut hydrated = HydratedBatch::default();

    for record in &batch.records {
        let user = match directory.refresh(&record.user).await {
            Some(fresh) => fresh,
            None => record.user.clone(),
        };

        let metadata =
            compose_metadata(record.source, record.target_date, &record.target_time, Some(record.metadata.clone()));

        let courts = record.court_preference.as_list();
        match BookingRequest::from_reservation_record(
            record.id.clone(),
            user,
            record.target_date,
            record.target_time.clone(),
            &courts,
            record.source,
            Some(metadata),
            record.executor_config.clone(),
        ) {
            Ok(request) => hydrated.requests.push((record.clone(), request)),
            Err(err) => {
                hydrated.failures.push(HydrationFailure { reservation_id: record.id.clone(), error: err.to_string() })
            }
        }
    }

    hydrated
}
