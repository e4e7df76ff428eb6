use async_trait::async_trait;
use browser_pool_cell::EMERGENCY_COURT_ID;
use chrono::Utc;
use tracing::{error, info};

use crate::context::RecoveryContext;
use crate::strategy::RecoveryStrategyExecutor;
use crate::types::{RecoveryAttempt, RecoveryResult, RecoveryStrategy};

/// Last-resort strategy: a standalone browser registered under the sentinel
/// court id, offering best-effort booking only (spec.md §4.F level 4).
pub struct EmergencyFallbackRecovery;

#[async_trait]
impl RecoveryStrategyExecutor for EmergencyFallbackRecovery {
    fn strategy(&self) -> RecoveryStrategy {
        RecoveryStrategy::EmergencyFallback
    }

    async fn execute(&self, context: &RecoveryContext) -> RecoveryResult {
        let start = std::time::Instant::now();
        info!("activating emergency fallback browser");

        let outcome = context.factory.create(EMERGENCY_COURT_ID, &context.emergency_url).await;
        let duration = start.elapsed().as_secs_f64();

        let (success, error_message) = match &outcome {
            Ok(page) => {
                context.pool.register_emergency_session(page.clone(), context.emergency_url.clone()).await;
                info!("emergency fallback browser activated");
                (true, None)
            }
            Err(err) => {
                error!(%err, "failed to activate emergency fallback browser");
                (false, Some(err.to_string()))
            }
        };

        let attempt = RecoveryAttempt {
            strategy: self.strategy(),
            timestamp: Utc::now(),
            courts_affected: vec![EMERGENCY_COURT_ID],
            success,
            error_message: error_message.clone(),
            duration_seconds: duration,
        };

        RecoveryResult {
            success,
            strategy_used: self.strategy(),
            courts_recovered: if success { vec![EMERGENCY_COURT_ID] } else { Vec::new() },
            courts_failed: if success { Vec::new() } else { vec![EMERGENCY_COURT_ID] },
            message: if success {
                "emergency browser activated - limited functionality available".to_string()
            } else {
                "failed to activate emergency fallback".to_string()
            },
            error_details: error_message,
            attempts: vec![attempt],
            total_duration_seconds: duration,
        }
    }
}
