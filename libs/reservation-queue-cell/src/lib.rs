pub mod error;
pub mod store;
pub mod transitions;
pub mod validation;

pub use error::QueueError;
pub use store::{SharedStore, Store};
pub use transitions::{add_to_waitlist, apply_status_update, expire_if_stale, promote_from_waitlist};
pub use validation::ensure_unique_slot;
