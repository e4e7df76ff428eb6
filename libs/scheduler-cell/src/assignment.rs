use std::collections::HashSet;

use shared_models::ReservationRecord;

/// One booking attempt the dispatcher hands to the executor pool
/// (spec.md §4.I rule 5: "reservation_id, target_court, attempt_number").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub reservation_id: String,
    pub target_court: u32,
    pub attempt_number: u32,
}

/// A court-identified browser paired with the attempt it should run.
/// Browsers are assigned by court identity (spec.md §4.I rule 4): court 1
/// gets browser 1, etc. The emergency sentinel court is never produced
/// here — only the recovery orchestrator maps onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserAssignment {
    pub browser_id: u32,
    pub attempt: Attempt,
}

/// Result of assigning one batch (all reservations for a single slot) to
/// the pool's available courts.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPlan {
    pub confirmed: Vec<ReservationRecord>,
    /// Waitlisted records paired with their 1-based position.
    pub waitlisted: Vec<(ReservationRecord, u32)>,
    pub browser_assignments: Vec<BrowserAssignment>,
}

/// Decides who gets which court on which browser for one batch (spec.md
/// §4.I). Stateless: every call is given the current set of courts the
/// pool can actually serve.
pub struct AssignmentOrchestrator;

impl AssignmentOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Builds the plan for `records`, all of which target the same
    /// `(date, time)` slot, against `available_courts`.
    ///
    /// Records are sorted by priority (admin=0, vip=1, regular=2) then by
    /// creation time (FIFO tiebreak). Walking the sorted list greedily and
    /// skipping courts already claimed is what gives the spec's conflict
    /// rule for free: a higher-priority record claims its preferred court
    /// first, so a lower-priority record that wanted the same court simply
    /// finds it gone and falls through to its next preference.
    pub fn plan(&self, records: &[ReservationRecord], available_courts: &[u32]) -> AssignmentPlan {
        let mut sorted: Vec<&ReservationRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.created_at.cmp(&b.created_at)));

        let available: HashSet<u32> = available_courts.iter().copied().collect();
        let mut taken: HashSet<u32> = HashSet::new();
        let mut plan = AssignmentPlan::default();
        let mut next_position = 1u32;

        for record in sorted {
            let court = record
                .court_preference
                .as_list()
                .into_iter()
                .find(|court| available.contains(court) && !taken.contains(court));

            match court {
                Some(court) => {
                    taken.insert(court);
                    plan.browser_assignments.push(BrowserAssignment {
                        browser_id: court,
                        attempt: Attempt {
                            reservation_id: record.id.clone(),
                            target_court: court,
                            attempt_number: record.attempts + 1,
                        },
                    });
                    plan.confirmed.push(record.clone());
                }
                None => {
                    plan.waitlisted.push((record.clone(), next_position));
                    next_position += 1;
                }
            }
        }

        plan
    }
}

impl Default for AssignmentOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};
    use shared_models::{BookingSource, BookingUser, CourtPreference, ReservationStatus};
    use std::collections::HashMap;

    fn record(user_id: &str, priority: u8, created_at: DateTime<Utc>, courts: &[u32]) -> ReservationRecord {
        ReservationRecord {
            id: format!("r-{user_id}"),
            user: BookingUser {
                user_id: user_id.to_string(),
                first_name: "Test".into(),
                last_name: "User".into(),
                email: "t@example.com".into(),
                phone: "555-0100".into(),
                tier: None,
            },
            target_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            target_time: "08:00".into(),
            court_preference: CourtPreference::from_sequence(courts).unwrap(),
            source: BookingSource::Queued,
            created_at,
            metadata: HashMap::new(),
            executor_config: None,
            status: ReservationStatus::Scheduled,
            scheduled_execution: created_at,
            attempts: 0,
            last_error: None,
            confirmation_code: None,
            confirmation_url: None,
            calendar_links: HashMap::new(),
            waitlist_position: None,
            priority,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn confirms_up_to_available_court_count() {
        let now = Utc::now();
        let records = vec![
            record("u1", 2, now, &[1]),
            record("u2", 2, now + chrono::Duration::seconds(1), &[1]),
            record("u3", 2, now + chrono::Duration::seconds(2), &[2]),
            record("u4", 2, now + chrono::Duration::seconds(3), &[3]),
        ];

        let plan = AssignmentOrchestrator::new().plan(&records, &[1, 2, 3]);
        assert_eq!(plan.confirmed.len(), 3);
        assert_eq!(plan.waitlisted.len(), 1);
        assert_eq!(plan.waitlisted[0].0.user.user_id, "u2");
        assert_eq!(plan.waitlisted[0].1, 1);
    }

    #[test]
    fn higher_priority_wins_court_conflict_and_lower_falls_through() {
        let now = Utc::now();
        let records = vec![
            record("regular", 2, now, &[1, 2]),
            record("vip", 1, now + chrono::Duration::seconds(1), &[1]),
        ];

        let plan = AssignmentOrchestrator::new().plan(&records, &[1, 2]);
        assert_eq!(plan.confirmed.len(), 2);

        let vip_assignment = plan.browser_assignments.iter().find(|a| a.attempt.reservation_id == "r-vip").unwrap();
        assert_eq!(vip_assignment.target_court, 1);

        let regular_assignment =
            plan.browser_assignments.iter().find(|a| a.attempt.reservation_id == "r-regular").unwrap();
        assert_eq!(regular_assignment.target_court, 2);
    }

    #[test]
    fn no_satisfiable_preference_is_waitlisted() {
        let now = Utc::now();
        let records = vec![record("u1", 2, now, &[5])];
        let plan = AssignmentOrchestrator::new().plan(&records, &[1, 2, 3]);
        assert!(plan.confirmed.is_empty());
        assert_eq!(plan.waitlisted.len(), 1);
    }

    #[test]
    fn browser_id_matches_target_court() {
        let now = Utc::now();
        let records = vec![record("u1", 2, now, &[2])];
        let plan = AssignmentOrchestrator::new().plan(&records, &[1, 2, 3]);
        assert_eq!(plan.browser_assignments[0].browser_id, 2);
    }
}
