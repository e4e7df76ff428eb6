use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::context::RecoveryContext;
use crate::strategy::RecoveryStrategyExecutor;
use crate::types::{RecoveryAttempt, RecoveryResult, RecoveryStrategy};

pub struct IndividualCourtRecovery;

#[async_trait]
impl RecoveryStrategyExecutor for IndividualCourtRecovery {
    fn strategy(&self) -> RecoveryStrategy {
        RecoveryStrategy::IndividualCourt
    }

    async fn execute(&self, context: &RecoveryContext) -> RecoveryResult {
        let court = context.target_courts().into_iter().next();
        let Some(court) = court else {
            return RecoveryResult {
                success: false,
                strategy_used: self.strategy(),
                courts_recovered: Vec::new(),
                courts_failed: Vec::new(),
                message: "no court to recover".to_string(),
                error_details: None,
                attempts: Vec::new(),
                total_duration_seconds: 0.0,
            };
        };

        let start = std::time::Instant::now();
        info!(court, "recovering individual court");
        let outcome = context.pool.recreate_session(court).await;
        let success = outcome.is_ok();
        let duration = start.elapsed().as_secs_f64();

        let attempt = RecoveryAttempt {
            strategy: self.strategy(),
            timestamp: Utc::now(),
            courts_affected: vec![court],
            success,
            error_message: outcome.as_ref().err().map(|e| e.to_string()),
            duration_seconds: duration,
        };

        RecoveryResult {
            success,
            strategy_used: self.strategy(),
            courts_recovered: if success { vec![court] } else { Vec::new() },
            courts_failed: if success { Vec::new() } else { vec![court] },
            message: if success {
                format!("successfully recovered court {court}")
            } else {
                format!("failed to recover court {court}")
            },
            error_details: outcome.err().map(|e| e.to_string()),
            attempts: vec![attempt],
            total_duration_seconds: duration,
        }
    }
}
