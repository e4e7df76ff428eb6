pub mod checker;
pub mod day_section;
pub mod error;
pub mod grouping;
pub mod selectors;

pub use checker::AvailabilityChecker;
pub use day_section::{parse_label, DayLabel, DaySection, RawDaySection};
pub use error::AvailabilityError;
pub use grouping::group_by_day;
