pub mod emergency_fallback;
pub mod full_restart;
pub mod individual_court;
pub mod partial_pool;

pub use emergency_fallback::EmergencyFallbackRecovery;
pub use full_restart::FullRestartRecovery;
pub use individual_court::IndividualCourtRecovery;
pub use partial_pool::PartialPoolRecovery;
