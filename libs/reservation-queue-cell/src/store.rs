use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use shared_config::Settings;
use shared_models::{BookingRequest, BookingResult, ReservationRecord, ReservationStatus};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::QueueError;
use crate::transitions::{add_to_waitlist, apply_status_update, expire_if_stale, promote_from_waitlist};
use crate::validation::ensure_unique_slot;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct StoreDocument {
    #[serde(default)]
    records: Vec<ReservationRecord>,
}

/// Durable reservation queue: one JSON file on disk, guarded by an
/// in-process `RwLock` so concurrent scheduler ticks and admin requests
/// don't race each other's read-modify-write cycle (spec.md §4.G).
pub struct Store {
    path: PathBuf,
    records: RwLock<Vec<ReservationRecord>>,
}

impl Store {
    /// Loads the store from `path`, self-healing any record left in an
    /// inconsistent state by a prior crash: missing ids get one, legacy
    /// `YYYY-MM-DD_HH:MM` time strings are normalized, and any non-terminal
    /// record whose target time is long past is marked expired.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut doc: StoreDocument = shared_database::read_json_or_default(&path);

        let mut healed = 0u32;
        for record in &mut doc.records {
            if record.id.trim().is_empty() {
                record.id = ReservationRecord::new_id();
                healed += 1;
            }
            let normalized = shared_utils::normalize_legacy_time(&record.target_time);
            if normalized != record.target_time {
                record.target_time = normalized;
                healed += 1;
            }
            if expire_if_stale(record) {
                healed += 1;
            }
        }

        if healed > 0 {
            info!("self-healed {healed} reservation record field(s) on load from {}", path.display());
        }

        let store = Self { path, records: RwLock::new(doc.records) };
        if healed > 0 {
            if let Err(err) = store.persist().await {
                warn!("failed to persist self-healed store: {err:#}");
            }
        }
        store
    }

    async fn persist(&self) -> anyhow::Result<()> {
        let records = self.records.read().await;
        let doc = StoreDocument { records: records.clone() };
        shared_database::write_json_atomic(&self.path, &doc)
    }

    /// Enqueues `request` as a new pending record, rejecting it if the same
    /// user already holds an active reservation for the same slot.
    pub async fn add(
        &self,
        request: BookingRequest,
        settings: &Settings,
    ) -> Result<ReservationRecord, QueueError> {
        let mut records = self.records.write().await;
        ensure_unique_slot(&records, &request.user.user_id, request.target_date, &request.target_time)?;

        let test_mode_minutes = settings.test_mode.enabled.then_some(settings.test_mode.trigger_delay_minutes);
        let scheduled_execution = shared_utils::compute_scheduled_execution(
            settings.timezone,
            request.target_date,
            &request.target_time,
            settings.booking_window_hours,
            test_mode_minutes,
            Utc::now(),
        );

        let priority = request.user.tier_priority();
        let record = ReservationRecord {
            id: ReservationRecord::new_id(),
            user: request.user,
            target_date: request.target_date,
            target_time: request.target_time,
            court_preference: request.court_preference,
            source: request.source,
            created_at: request.created_at,
            metadata: request.metadata,
            executor_config: request.executor_config,
            status: ReservationStatus::Pending,
            scheduled_execution,
            attempts: 0,
            last_error: None,
            confirmation_code: None,
            confirmation_url: None,
            calendar_links: HashMap::new(),
            waitlist_position: None,
            priority,
            extra: HashMap::new(),
        };

        records.push(record.clone());
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)?;
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Option<ReservationRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn list_by_user(&self, user_id: &str) -> Vec<ReservationRecord> {
        self.records.read().await.iter().filter(|r| r.user.user_id == user_id).cloned().collect()
    }

    /// All not-yet-executed records, regardless of schedule time. The
    /// scheduler buckets these into READY/HEALTH-CHECK groups itself
    /// (spec.md §4.H step 3).
    pub async fn list_pending(&self) -> Vec<ReservationRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| matches!(r.status, ReservationStatus::Pending | ReservationStatus::Scheduled))
            .cloned()
            .collect()
    }

    /// Records due for execution: status pending/scheduled and
    /// `scheduled_execution <= now`, ordered earliest-due first then by
    /// priority (spec.md §4.D tie-break).
    pub async fn list_due(&self) -> Vec<ReservationRecord> {
        let now = Utc::now();
        let mut due: Vec<ReservationRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| {
                matches!(r.status, ReservationStatus::Pending | ReservationStatus::Scheduled)
                    && r.scheduled_execution <= now
            })
            .cloned()
            .collect();
        due.sort_by(|a, b| a.scheduled_execution.cmp(&b.scheduled_execution).then(a.priority.cmp(&b.priority)));
        due
    }

    pub async fn list_by_slot(&self, date: NaiveDate, time: &str) -> Vec<ReservationRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.target_date == date && r.target_time == time)
            .cloned()
            .collect()
    }

    pub async fn list_waitlisted_for(&self, date: NaiveDate, time: &str) -> Vec<ReservationRecord> {
        let mut waiting: Vec<ReservationRecord> = self
            .list_by_slot(date, time)
            .await
            .into_iter()
            .filter(|r| r.status == ReservationStatus::Waitlisted)
            .collect();
        waiting.sort_by_key(|r| r.waitlist_position.unwrap_or(u32::MAX));
        waiting
    }

    pub async fn update_status(
        &self,
        id: &str,
        new_status: ReservationStatus,
        error: Option<String>,
    ) -> Result<ReservationRecord, QueueError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        apply_status_update(record, new_status, error)?;
        let updated = record.clone();
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)?;
        Ok(updated)
    }

    /// Records the outcome of a dispatched booking attempt: transitions to
    /// SUCCESS or FAILED and, on success, carries the confirmation details
    /// from the executor's [`BookingResult`] onto the durable record.
    pub async fn complete_booking(&self, id: &str, result: &BookingResult) -> Result<ReservationRecord, QueueError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| QueueError::NotFound(id.to_string()))?;

        let (status, error) = if result.is_success() {
            (ReservationStatus::Success, None)
        } else {
            (ReservationStatus::Failed, result.message.clone())
        };
        apply_status_update(record, status, error)?;

        if result.is_success() {
            record.confirmation_code = result.confirmation_code.clone();
            record.confirmation_url = result.confirmation_url.clone();
        }

        let updated = record.clone();
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)?;
        Ok(updated)
    }

    /// Bumps `id` off its slot (freeing it for the next in line) and places
    /// it on the waitlist at `position`.
    pub async fn bump_and_waitlist(&self, id: &str, position: u32) -> Result<ReservationRecord, QueueError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        apply_status_update(record, ReservationStatus::Bumped, None)?;
        add_to_waitlist(record, position)?;
        let updated = record.clone();
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)?;
        Ok(updated)
    }

    pub async fn cancel(&self, id: &str) -> Result<ReservationRecord, QueueError> {
        self.update_status(id, ReservationStatus::Cancelled, None).await
    }

    /// Deletes `id` from the queue entirely. Used for a fatal failure that
    /// isn't retained for test-mode retry (spec.md §4.G: "remove(id) —
    /// delete; intended for fatal failures unless retention flag is set in
    /// test mode").
    pub async fn remove(&self, id: &str) -> Result<(), QueueError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(QueueError::NotFound(id.to_string()));
        }
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)
    }

    /// Confirms the waitlisted record `id`, clearing its waitlist position.
    /// Caller is responsible for shifting the remaining positions down via
    /// [`Store::shift_waitlist_positions`].
    pub async fn promote_waitlisted(&self, id: &str) -> Result<ReservationRecord, QueueError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        promote_from_waitlist(record)?;
        let updated = record.clone();
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)?;
        Ok(updated)
    }

    /// Closes the gap left by a promotion: every still-waitlisted record for
    /// `(date, time)` moves one position closer to the front (spec.md §4.I
    /// cancellation rule: "remaining waitlist positions shift down by one").
    pub async fn shift_waitlist_positions(&self, date: NaiveDate, time: &str) -> Result<(), QueueError> {
        let mut records = self.records.write().await;
        let mut waitlisted: Vec<&mut ReservationRecord> = records
            .iter_mut()
            .filter(|r| r.target_date == date && r.target_time == time && r.status == ReservationStatus::Waitlisted)
            .collect();
        waitlisted.sort_by_key(|r| r.waitlist_position.unwrap_or(u32::MAX));
        for (index, record) in waitlisted.into_iter().enumerate() {
            record.waitlist_position = Some(index as u32 + 1);
        }
        drop(records);
        self.persist().await.map_err(QueueError::Persistence)
    }

    pub async fn all(&self) -> Vec<ReservationRecord> {
        self.records.read().await.clone()
    }
}

pub type SharedStore = Arc<Store>;
