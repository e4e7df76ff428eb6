use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::context::RecoveryContext;
use crate::strategy::RecoveryStrategyExecutor;
use crate::types::{RecoveryAttempt, RecoveryResult, RecoveryStrategy};

const RESTART_PAUSE: std::time::Duration = std::time::Duration::from_secs(2);

pub struct FullRestartRecovery;

#[async_trait]
impl RecoveryStrategyExecutor for FullRestartRecovery {
    fn strategy(&self) -> RecoveryStrategy {
        RecoveryStrategy::FullRestart
    }

    async fn execute(&self, context: &RecoveryContext) -> RecoveryResult {
        let original_courts = context.pool.courts();
        let start = std::time::Instant::now();
        warn!("performing full browser pool restart");

        if let Err(err) = context.pool.stop().await {
            warn!(%err, "error stopping pool during full restart, continuing");
        }

        tokio::time::sleep(RESTART_PAUSE).await;

        if let Err(err) = context.pool.start().await {
            warn!(%err, "error restarting pool");
        }

        let recovered = context.pool.get_available_courts().await;
        let failed: Vec<u32> =
            original_courts.iter().copied().filter(|c| !recovered.contains(c)).collect();
        let success = !recovered.is_empty();
        let duration = start.elapsed().as_secs_f64();

        let attempt = RecoveryAttempt {
            strategy: self.strategy(),
            timestamp: Utc::now(),
            courts_affected: original_courts.clone(),
            success,
            error_message: None,
            duration_seconds: duration,
        };

        RecoveryResult {
            success,
            strategy_used: self.strategy(),
            courts_recovered: recovered.clone(),
            courts_failed: failed,
            message: format!(
                "full restart completed: {}/{} courts ready",
                recovered.len(),
                original_courts.len()
            ),
            error_details: None,
            attempts: vec![attempt],
            total_duration_seconds: duration,
        }
    }
}
