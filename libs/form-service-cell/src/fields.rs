/// Venue booking form field keys and their default CSS selectors
/// (spec.md §6 External Interfaces). Kept as data, not a hardcoded match,
/// so `executor_config` can override a selector if the venue's markup
/// drifts without a code change.
pub const FORM_SELECTORS: &[(&str, &str)] = &[
    ("firstName", "input[name=\"client.firstName\"]"),
    ("lastName", "input[name=\"client.lastName\"]"),
    ("phone", "input[name=\"client.phone\"]"),
    ("email", "input[name=\"client.email\"]"),
];

pub fn required_fields() -> Vec<&'static str> {
    FORM_SELECTORS.iter().map(|(key, _)| *key).collect()
}

pub fn selector_for(field: &str) -> Option<&'static str> {
    FORM_SELECTORS.iter().find(|(key, _)| *key == field).map(|(_, sel)| *sel)
}
