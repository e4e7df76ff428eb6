use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use browser_pool_cell::{BrowserPool, SessionFactory};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::context::RecoveryContext;
use crate::strategies::{
    EmergencyFallbackRecovery, FullRestartRecovery, IndividualCourtRecovery, PartialPoolRecovery,
};
use crate::strategy::RecoveryStrategyExecutor;
use crate::types::{RecoveryAttempt, RecoveryResult, RecoveryStats, RecoveryStrategy, StrategyStats};

const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Gates booking and restores the pool when health degrades, escalating
/// through the four strategies in spec.md §4.F. Recovery is serialized by a
/// single mutex so overlapping failures cannot trigger compounding
/// recoveries (spec.md §5).
pub struct RecoveryOrchestrator {
    pool: Arc<BrowserPool>,
    factory: Arc<dyn SessionFactory>,
    emergency_url: String,
    strategy_table: HashMap<RecoveryStrategy, Box<dyn RecoveryStrategyExecutor>>,
    recovery_lock: Mutex<()>,
    history: Mutex<Vec<RecoveryAttempt>>,
    recovery_timeout: Duration,
    emergency_active: Mutex<bool>,
}

impl RecoveryOrchestrator {
    pub fn new(pool: Arc<BrowserPool>, factory: Arc<dyn SessionFactory>, emergency_url: String) -> Self {
        let executors: Vec<Box<dyn RecoveryStrategyExecutor>> = vec![
            Box::new(IndividualCourtRecovery),
            Box::new(PartialPoolRecovery),
            Box::new(FullRestartRecovery),
            Box::new(EmergencyFallbackRecovery),
        ];
        // Keyed by each executor's own `strategy()` tag rather than a
        // hand-written key, so the table can never drift from the impl.
        let strategy_table: HashMap<RecoveryStrategy, Box<dyn RecoveryStrategyExecutor>> =
            executors.into_iter().map(|executor| (executor.strategy(), executor)).collect();

        Self {
            pool,
            factory,
            emergency_url,
            strategy_table,
            recovery_lock: Mutex::new(()),
            history: Mutex::new(Vec::new()),
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
            emergency_active: Mutex::new(false),
        }
    }

    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }

    /// Escalation order per spec.md §4.F: complete failure -> full restart;
    /// single court -> individual; multiple courts -> partial pool. Each
    /// list always ends with full restart then emergency fallback.
    fn escalation_order(failed_courts: &Option<Vec<u32>>) -> Vec<RecoveryStrategy> {
        use RecoveryStrategy::*;
        match failed_courts {
            None => vec![FullRestart, EmergencyFallback],
            Some(courts) if courts.len() == 1 => {
                vec![IndividualCourt, PartialPool, FullRestart, EmergencyFallback]
            }
            Some(_) => vec![PartialPool, FullRestart, EmergencyFallback],
        }
    }

    /// Runs the escalation, trying each strategy in order until one
    /// succeeds or all are exhausted.
    pub async fn recover(
        &self,
        failed_courts: Option<Vec<u32>>,
        error_context: Option<String>,
    ) -> RecoveryResult {
        let _guard = self.recovery_lock.lock().await;
        let start = std::time::Instant::now();
        let strategies = Self::escalation_order(&failed_courts);

        warn!(?failed_courts, ?error_context, "starting browser pool recovery");

        let context = RecoveryContext::new(
            self.pool.clone(),
            self.factory.clone(),
            self.emergency_url.clone(),
            failed_courts.clone(),
            error_context,
        );

        let mut all_attempts = Vec::new();

        for strategy in &strategies {
            let executor = self
                .strategy_table
                .get(strategy)
                .expect("every RecoveryStrategy variant has a table entry");

            info!(strategy = strategy.as_str(), "attempting recovery strategy");

            let outcome = tokio::time::timeout(self.recovery_timeout, executor.execute(&context)).await;

            let result = match outcome {
                Ok(result) => result,
                Err(_) => {
                    error!(strategy = strategy.as_str(), "recovery strategy timed out");
                    RecoveryResult {
                        success: false,
                        strategy_used: *strategy,
                        courts_recovered: Vec::new(),
                        courts_failed: context.target_courts(),
                        message: format!("{} timed out", strategy.as_str()),
                        error_details: Some("recovery_timeout_seconds exceeded".to_string()),
                        attempts: vec![RecoveryAttempt {
                            strategy: *strategy,
                            timestamp: chrono::Utc::now(),
                            courts_affected: context.target_courts(),
                            success: false,
                            error_message: Some("timed out".to_string()),
                            duration_seconds: self.recovery_timeout.as_secs_f64(),
                        }],
                        total_duration_seconds: self.recovery_timeout.as_secs_f64(),
                    }
                }
            };

            all_attempts.extend(result.attempts.clone());
            self.history.lock().await.extend(result.attempts.clone());

            if *strategy == RecoveryStrategy::EmergencyFallback && result.success {
                *self.emergency_active.lock().await = true;
            }

            if result.success {
                info!(
                    strategy = strategy.as_str(),
                    duration = start.elapsed().as_secs_f64(),
                    "recovery successful"
                );
                return RecoveryResult {
                    attempts: all_attempts,
                    total_duration_seconds: start.elapsed().as_secs_f64(),
                    ..result
                };
            }

            warn!(strategy = strategy.as_str(), message = %result.message, "recovery strategy failed, escalating");
        }

        let duration = start.elapsed().as_secs_f64();
        RecoveryResult {
            success: false,
            strategy_used: RecoveryStrategy::EmergencyFallback,
            courts_recovered: Vec::new(),
            courts_failed: failed_courts.unwrap_or_else(|| self.pool.courts()),
            message: "all recovery strategies failed".to_string(),
            error_details: Some(format!("tried {} strategies over {:.1}s", strategies.len(), duration)),
            attempts: all_attempts,
            total_duration_seconds: duration,
        }
    }

    /// Whether recovery is needed and, if so, the courts to target.
    pub async fn is_recovery_needed(&self) -> (bool, Option<Vec<u32>>) {
        let report = self.pool.health_check().await;
        let failed = report.failed_courts();
        if failed.is_empty() {
            (false, None)
        } else if failed.len() == self.pool.courts().len() {
            (true, None)
        } else {
            (true, Some(failed))
        }
    }

    pub async fn stats(&self) -> RecoveryStats {
        let history = self.history.lock().await;
        let total = history.len() as u32;
        let successful = history.iter().filter(|a| a.success).count() as u32;

        let mut strategy_stats: HashMap<String, StrategyStats> = HashMap::new();
        for attempt in history.iter() {
            let entry = strategy_stats.entry(attempt.strategy.as_str().to_string()).or_default();
            entry.total += 1;
            if attempt.success {
                entry.successful += 1;
            }
        }

        RecoveryStats {
            total_recovery_attempts: total,
            successful_recoveries: successful,
            success_rate: if total > 0 { successful as f64 / total as f64 } else { 0.0 },
            strategy_stats,
            emergency_browser_active: *self.emergency_active.lock().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use browser_pool_cell::{FakePage, PoolError};
    use std::collections::HashMap as Map;

    struct FakeFactory;

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn create(&self, _court: u32, _base_url: &str) -> Result<Arc<dyn browser_pool_cell::Page>, PoolError> {
            Ok(Arc::new(FakePage::new()))
        }
    }

    fn court_urls() -> Map<u32, String> {
        [(1, "https://venue/court1".to_string()), (2, "https://venue/court2".to_string())]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn single_court_escalates_from_individual() {
        let pool = Arc::new(BrowserPool::new(court_urls(), Arc::new(FakeFactory)));
        pool.start().await.unwrap();
        let orchestrator =
            RecoveryOrchestrator::new(pool, Arc::new(FakeFactory), "https://venue/emergency".into());

        let result = orchestrator.recover(Some(vec![1]), Some("dead page".into())).await;
        assert!(result.success);
        assert_eq!(result.strategy_used, RecoveryStrategy::IndividualCourt);
    }

    #[tokio::test]
    async fn complete_failure_starts_with_full_restart() {
        let pool = Arc::new(BrowserPool::new(court_urls(), Arc::new(FakeFactory)));
        let orchestrator =
            RecoveryOrchestrator::new(pool, Arc::new(FakeFactory), "https://venue/emergency".into());

        let result = orchestrator.recover(None, None).await;
        assert!(result.success);
        assert_eq!(result.strategy_used, RecoveryStrategy::FullRestart);
    }

    #[tokio::test]
    async fn stats_report_totals_and_success_rate() {
        let pool = Arc::new(BrowserPool::new(court_urls(), Arc::new(FakeFactory)));
        pool.start().await.unwrap();
        let orchestrator =
            RecoveryOrchestrator::new(pool, Arc::new(FakeFactory), "https://venue/emergency".into());

        orchestrator.recover(Some(vec![1]), None).await;
        let stats = orchestrator.stats().await;
        assert_eq!(stats.total_recovery_attempts, 1);
        assert_eq!(stats.successful_recoveries, 1);
        assert!(!stats.emergency_browser_active);
    }
}
