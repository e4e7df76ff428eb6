use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::context::RecoveryContext;
use crate::strategy::RecoveryStrategyExecutor;
use crate::types::{RecoveryAttempt, RecoveryResult, RecoveryStrategy};

/// Per-index stagger so recreated sessions don't all hit the venue at once
/// (spec.md §4.F: "1.5 s per index").
const STAGGER_SECONDS: f64 = 1.5;

pub struct PartialPoolRecovery;

#[async_trait]
impl RecoveryStrategyExecutor for PartialPoolRecovery {
    fn strategy(&self) -> RecoveryStrategy {
        RecoveryStrategy::PartialPool
    }

    async fn execute(&self, context: &RecoveryContext) -> RecoveryResult {
        let courts = context.target_courts();
        let start = std::time::Instant::now();
        info!(?courts, "recovering partial pool");

        let mut tasks = Vec::with_capacity(courts.len());
        for (index, &court) in courts.iter().enumerate() {
            let delay = std::time::Duration::from_secs_f64(index as f64 * STAGGER_SECONDS);
            let pool = context.pool.clone();
            tasks.push(async move {
                tokio::time::sleep(delay).await;
                (court, pool.recreate_session(court).await)
            });
        }

        let results = futures::future::join_all(tasks).await;

        let mut recovered = Vec::new();
        let mut failed = Vec::new();
        for (court, outcome) in results {
            match outcome {
                Ok(()) => {
                    info!(court, "recovered court in partial pool pass");
                    recovered.push(court);
                }
                Err(err) => {
                    error!(court, %err, "failed to recover court in partial pool pass");
                    failed.push(court);
                }
            }
        }

        let duration = start.elapsed().as_secs_f64();
        let success = !recovered.is_empty();

        let attempt = RecoveryAttempt {
            strategy: self.strategy(),
            timestamp: Utc::now(),
            courts_affected: courts.clone(),
            success,
            error_message: if failed.is_empty() { None } else { Some(format!("courts failed: {failed:?}")) },
            duration_seconds: duration,
        };

        RecoveryResult {
            success,
            strategy_used: self.strategy(),
            courts_recovered: recovered.clone(),
            courts_failed: failed,
            message: format!("recovered {}/{} courts", recovered.len(), courts.len()),
            error_details: None,
            attempts: vec![attempt],
            total_duration_seconds: duration,
        }
    }
}
