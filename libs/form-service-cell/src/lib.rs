pub mod error;
pub mod fields;
pub mod outcome;
pub mod service;

pub use error::FormError;
pub use fields::{required_fields, selector_for, FORM_SELECTORS};
pub use outcome::SubmitOutcome;
pub use service::FormService;
