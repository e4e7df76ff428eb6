/// Clickable time-slot button. Matched both by class and, as a fallback,
/// by any button whose text looks like `HH:MM`, to tolerate markup drift
/// (spec.md §4.D's "strict class and text-matched variants" applies here
/// for extraction too, not only for clicking).
pub const TIME_BUTTON_SELECTOR: &str = "button.time-selection";

/// Shown instead of any time buttons when the court has nothing open.
pub const UNAVAILABLE_MARKER_SELECTOR: &str = "[class*=\"no-availability\"]";

/// Evaluated in the page to collect time buttons grouped by their nearest
/// day-section heading. Falls back to an empty array when the grouping
/// markup itself is missing, letting the caller apply its own
/// assign-to-today fallback (spec.md §4.C.3).
pub const DAY_SECTION_EXTRACTION_SCRIPT: &str = r#"
() => {
    const headings = Array.from(document.querySelectorAll('[class*="day-section"]'));
    if (headings.length === 0) { return []; }

    return headings.map(heading => {
        const label = (heading.querySelector('[class*="day-label"]') || heading).textContent.trim();
        const buttons = Array.from(heading.querySelectorAll('button.time-selection'));
        const times = buttons.map(b => b.textContent.trim()).filter(Boolean);
        return { label, times };
    });
}
"#;
