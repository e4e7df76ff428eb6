/// Time-slot button, matched both by its strict class and (through
/// `click_matching_text`) by visible label, tolerating markup drift
/// (spec.md §4.D "FIND SLOT").
pub const TIME_BUTTON_TAG: &str = "button.time-selection";

/// Shown instead of a bookable slot when the venue has nothing open for the
/// requested day; short-circuits navigation without waiting out the full
/// progressive-readiness ladder.
pub const UNAVAILABLE_MARKER_SELECTOR: &str = "[class*=\"no-availability\"]";

/// Presence of this selector means the booking form rendered after a click;
/// its absence after the DOM settles means someone else took the slot.
pub const FORM_READY_SELECTOR: &str = "input[name=\"client.firstName\"]";
