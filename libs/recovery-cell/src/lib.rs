pub mod context;
pub mod error;
pub mod orchestrator;
pub mod strategies;
pub mod strategy;
pub mod types;

pub use context::RecoveryContext;
pub use error::RecoveryError;
pub use orchestrator::RecoveryOrchestrator;
pub use strategy::RecoveryStrategyExecutor;
pub use types::{RecoveryAttempt, RecoveryResult, RecoveryStats, RecoveryStrategy, StrategyStats};
