use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use shared_utils::{day_after_tomorrow_is_feasible, parse_hhmm, today_is_feasible};

use crate::day_section::DaySection;

/// Groups extracted day sections into a `date -> times` map, applying the
/// day-feasibility guardrails and the today-only past-time filter from
/// spec.md §4.C.
pub fn group_by_day(
    sections: Vec<DaySection>,
    tz: Tz,
    now: DateTime<Utc>,
    booking_window_hours: i64,
) -> HashMap<NaiveDate, Vec<String>> {
    let today = now.with_timezone(&tz).date_naive();
    let mut grouped: HashMap<NaiveDate, Vec<String>> = HashMap::new();

    for section in sections {
        let date = section.label.resolve(today);
        grouped.entry(date).or_default().extend(section.times);
    }

    if let Some(times) = grouped.get_mut(&today) {
        if !today_is_feasible(tz, now) {
            times.clear();
        } else {
            times.retain(|time| is_future_time(time, tz, now));
        }
    }

    let day_after = today + chrono::Duration::days(2);
    if let Some(times) = grouped.get(&day_after) {
        let feasible = times
            .iter()
            .min()
            .map(|earliest| day_after_tomorrow_is_feasible(tz, now, earliest, booking_window_hours))
            .unwrap_or(false);
        if !feasible {
            grouped.remove(&day_after);
        }
    }

    grouped.retain(|_, times| !times.is_empty());
    grouped
}

fn is_future_time(time: &str, tz: Tz, now: DateTime<Utc>) -> bool {
    let Some(parsed) = parse_hhmm(time) else { return false };
    let local_now = now.with_timezone(&tz);
    parsed >= local_now.time()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_section::DayLabel;
    use chrono::TimeZone;

    #[test]
    fn groups_sections_by_resolved_date() {
        let tz = chrono_tz::America::Guatemala;
        let now = tz.with_ymd_and_hms(2026, 8, 3, 6, 0, 0).unwrap().with_timezone(&Utc);
        let sections = vec![
            DaySection { label: DayLabel::Today, times: vec!["08:00".into(), "09:00".into()] },
            DaySection { label: DayLabel::Tomorrow, times: vec!["10:00".into()] },
        ];

        let grouped = group_by_day(sections, tz, now, 48);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()], vec!["08:00", "09:00"]);
    }

    #[test]
    fn drops_past_times_for_today() {
        let tz = chrono_tz::America::Guatemala;
        let now = tz.with_ymd_and_hms(2026, 8, 3, 10, 30, 0).unwrap().with_timezone(&Utc);
        let sections =
            vec![DaySection { label: DayLabel::Today, times: vec!["08:00".into(), "11:00".into()] }];

        let grouped = group_by_day(sections, tz, now, 48);
        assert_eq!(grouped[&NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()], vec!["11:00"]);
    }

    #[test]
    fn drops_today_entirely_past_last_bookable_hour() {
        let tz = chrono_tz::America::Guatemala;
        let now = tz.with_ymd_and_hms(2026, 8, 3, 22, 0, 0).unwrap().with_timezone(&Utc);
        let sections = vec![DaySection { label: DayLabel::Today, times: vec!["23:00".into()] }];

        let grouped = group_by_day(sections, tz, now, 48);
        assert!(!grouped.contains_key(&NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()));
    }

    #[test]
    fn drops_day_after_tomorrow_when_outside_advance_window() {
        let tz = chrono_tz::America::Guatemala;
        let now = tz.with_ymd_and_hms(2026, 8, 3, 6, 0, 0).unwrap().with_timezone(&Utc);
        let sections =
            vec![DaySection { label: DayLabel::Explicit(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()), times: vec!["08:00".into()] }];

        let grouped = group_by_day(sections, tz, now, 48);
        assert!(!grouped.contains_key(&NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()));
    }
}
