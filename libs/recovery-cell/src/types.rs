use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recovery strategies in escalation order, least to most disruptive
/// (spec.md §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    IndividualCourt,
    PartialPool,
    FullRestart,
    EmergencyFallback,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrategy::IndividualCourt => "individual_court",
            RecoveryStrategy::PartialPool => "partial_pool",
            RecoveryStrategy::FullRestart => "full_restart",
            RecoveryStrategy::EmergencyFallback => "emergency_fallback",
        }
    }
}

/// Record of one strategy attempt, kept for the orchestrator's history and
/// stats reporting.
#[derive(Debug, Clone)]
pub struct RecoveryAttempt {
    pub strategy: RecoveryStrategy,
    pub timestamp: DateTime<Utc>,
    pub courts_affected: Vec<u32>,
    pub success: bool,
    pub error_message: Option<String>,
    pub duration_seconds: f64,
}

/// Structured result returned by a single strategy execution.
#[derive(Debug, Clone)]
pub struct RecoveryResult {
    pub success: bool,
    pub strategy_used: RecoveryStrategy,
    pub courts_recovered: Vec<u32>,
    pub courts_failed: Vec<u32>,
    pub message: String,
    pub error_details: Option<String>,
    pub attempts: Vec<RecoveryAttempt>,
    pub total_duration_seconds: f64,
}

/// Per-strategy totals reported alongside the overall recovery stats.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StrategyStats {
    pub total: u32,
    pub successful: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryStats {
    pub total_recovery_attempts: u32,
    pub successful_recoveries: u32,
    pub success_rate: f64,
    pub strategy_stats: HashMap<String, StrategyStats>,
    pub emergency_browser_active: bool,
}
