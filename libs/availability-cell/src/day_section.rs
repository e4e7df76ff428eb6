use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Deserialize;

/// How the venue's page labels a group of time buttons. Resolved against a
/// reference "today" date rather than guessed from button position — the
/// replacement for the position-based heuristic spec.md §9 flags as fragile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    Today,
    Tomorrow,
    Weekday(Weekday),
    Explicit(NaiveDate),
}

impl DayLabel {
    /// Resolves the label to a concrete calendar date relative to `today`.
    /// A bare weekday name resolves to the next occurrence of that weekday
    /// on or after `today` (same-day counts, since the venue always shows
    /// the current day under its own weekday heading when not "today").
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DayLabel::Today => today,
            DayLabel::Tomorrow => today + Duration::days(1),
            DayLabel::Weekday(target) => {
                let mut candidate = today;
                loop {
                    if candidate.weekday() == *target {
                        return candidate;
                    }
                    candidate += Duration::days(1);
                }
            }
            DayLabel::Explicit(date) => *date,
        }
    }
}

/// Raw shape returned by the page extraction script: one section per day
/// heading, each with the visible time-button texts under it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDaySection {
    pub label: String,
    pub times: Vec<String>,
}

/// A day section with its label already parsed into a [`DayLabel`].
#[derive(Debug, Clone)]
pub struct DaySection {
    pub label: DayLabel,
    pub times: Vec<String>,
}

/// Parses the page's raw label string into a [`DayLabel`]. Unrecognized
/// labels fall back to `Today`, matching the page's own fallback of
/// attributing ungrouped times to the current day.
pub fn parse_label(raw: &str) -> DayLabel {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "today" | "hoy" => DayLabel::Today,
        "tomorrow" | "mañana" | "manana" => DayLabel::Tomorrow,
        "monday" | "lunes" => DayLabel::Weekday(Weekday::Mon),
        "tuesday" | "martes" => DayLabel::Weekday(Weekday::Tue),
        "wednesday" | "miércoles" | "miercoles" => DayLabel::Weekday(Weekday::Wed),
        "thursday" | "jueves" => DayLabel::Weekday(Weekday::Thu),
        "friday" | "viernes" => DayLabel::Weekday(Weekday::Fri),
        "saturday" | "sábado" | "sabado" => DayLabel::Weekday(Weekday::Sat),
        "sunday" | "domingo" => DayLabel::Weekday(Weekday::Sun),
        _ => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(DayLabel::Explicit)
            .unwrap_or(DayLabel::Today),
    }
}
