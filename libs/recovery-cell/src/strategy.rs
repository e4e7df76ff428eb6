use async_trait::async_trait;

use crate::context::RecoveryContext;
use crate::types::{RecoveryResult, RecoveryStrategy};

/// Interface implemented by each recovery strategy, keyed by tag in the
/// orchestrator's strategy table (spec.md §9 Design Notes: "tagged variant
/// plus a strategy table keyed by tag", not a class hierarchy).
#[async_trait]
pub trait RecoveryStrategyExecutor: Send + Sync {
    fn strategy(&self) -> RecoveryStrategy;

    async fn execute(&self, context: &RecoveryContext) -> RecoveryResult;
}
