use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The last hour of the day the venue accepts a booking click for "today".
/// Matches the day-feasibility guardrail in spec.md §4.C.
const LAST_BOOKABLE_HOUR: u32 = 21;

/// Parses `HH:MM` into hour/minute, returning `None` if malformed.
pub fn parse_hhmm(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M").ok()
}

/// Tolerates the legacy `YYYY-MM-DD_HH:MM` encoding found in old queue
/// files by taking the last 5 characters; new writes never emit this form.
pub fn normalize_legacy_time(raw: &str) -> String {
    if raw.len() > 5 && raw.as_bytes()[raw.len() - 5] != b':' {
        // defensive: fall through, still take the tail below
    }
    if let Some(idx) = raw.rfind('_') {
        if raw.len() - idx - 1 == 5 {
            return raw[idx + 1..].to_string();
        }
    }
    if raw.len() >= 5 {
        let tail = &raw[raw.len() - 5..];
        if parse_hhmm(tail).is_some() {
            return tail.to_string();
        }
    }
    raw.to_string()
}

/// Venue-local "now", converted to UTC for storage and comparison.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Resolves a `(date, time)` pair in the venue timezone to a UTC instant.
pub fn target_datetime_utc(tz: Tz, date: NaiveDate, time: &str) -> Option<DateTime<Utc>> {
    let naive_time = parse_hhmm(time)?;
    let naive = date.and_time(naive_time);
    tz.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
}

/// The instant at which the venue opens the booking window for `(date,
/// time)`: `target − booking_window_hours`.
pub fn window_open(
    tz: Tz,
    date: NaiveDate,
    time: &str,
    booking_window_hours: i64,
) -> Option<DateTime<Utc>> {
    target_datetime_utc(tz, date, time).map(|target| target - Duration::hours(booking_window_hours))
}

/// Scheduling rule from spec.md §3: 30 seconds before window-open, unless
/// that instant is already past, in which case `now + 1 minute`. Under test
/// mode, `now + trigger_delay_minutes` regardless of the real target.
pub fn compute_scheduled_execution(
    tz: Tz,
    date: NaiveDate,
    time: &str,
    booking_window_hours: i64,
    test_mode_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if let Some(minutes) = test_mode_minutes {
        return now + Duration::minutes(minutes);
    }

    match window_open(tz, date, time, booking_window_hours) {
        Some(open) => {
            let candidate = open - Duration::seconds(30);
            if candidate <= now {
                now + Duration::minutes(1)
            } else {
                candidate
            }
        }
        None => now + Duration::minutes(1),
    }
}

/// Today is feasible only if the current venue-local hour is before the
/// last bookable hour of the day (spec.md §4.C Day feasibility guardrails).
pub fn today_is_feasible(tz: Tz, now: DateTime<Utc>) -> bool {
    now.with_timezone(&tz).time().hour_lt(LAST_BOOKABLE_HOUR)
}

/// The day after tomorrow is feasible only if its earliest slot falls
/// within the advance booking window.
pub fn day_after_tomorrow_is_feasible(
    tz: Tz,
    now: DateTime<Utc>,
    earliest_slot: &str,
    booking_window_hours: i64,
) -> bool {
    let local_now = now.with_timezone(&tz);
    let target_date = local_now.date_naive() + Duration::days(2);
    match window_open(tz, target_date, earliest_slot, booking_window_hours) {
        Some(open) => open <= now,
        None => false,
    }
}

trait HourLt {
    fn hour_lt(&self, hour: u32) -> bool;
}

impl HourLt for NaiveTime {
    fn hour_lt(&self, hour: u32) -> bool {
        use chrono::Timelike;
        self.hour() < hour
    }
}
