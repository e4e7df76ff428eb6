use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Overall health of the browser worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
    Failed,
}

/// Result of a health check: overall status plus per-court detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: HealthStatus,
    pub courts: HashMap<u32, HealthStatus>,
}

impl HealthReport {
    pub fn healthy(courts: &[u32]) -> Self {
        Self {
            overall: HealthStatus::Healthy,
            courts: courts.iter().map(|&c| (c, HealthStatus::Healthy)).collect(),
        }
    }

    /// Worst-of per-court status becomes the overall status.
    pub fn from_courts(courts: HashMap<u32, HealthStatus>) -> Self {
        let overall = courts
            .values()
            .copied()
            .max()
            .unwrap_or(HealthStatus::Failed);
        Self { overall, courts }
    }

    pub fn failed_courts(&self) -> Vec<u32> {
        let mut failed: Vec<u32> = self
            .courts
            .iter()
            .filter(|(_, status)| matches!(status, HealthStatus::Critical | HealthStatus::Failed))
            .map(|(court, _)| *court)
            .collect();
        failed.sort_unstable();
        failed
    }
}

/// Logical handle to a pre-warmed browser session, owned exclusively by the
/// browser worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSessionInfo {
    pub court: u32,
    pub current_url: String,
    pub age_seconds: i64,
    pub healthy: bool,
    pub critical_operation: bool,
}
