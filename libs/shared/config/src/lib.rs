use std::env;

use chrono_tz::Tz;
use tracing::warn;

/// Process-wide settings, loaded once at startup and injected everywhere.
///
/// Every cell reads configuration through this struct instead of touching
/// `std::env` directly — the original system leaked `PRODUCTION_MODE` and
/// test-mode flags into random modules; this consolidates them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timezone: Tz,
    pub courts: Vec<u32>,
    pub booking_window_hours: i64,
    pub poll_interval_seconds: u64,
    pub max_retries: u32,
    pub attempt_budget_seconds: u64,
    pub recovery_timeout_seconds: u64,
    pub max_recovery_attempts: u32,
    pub production_mode: bool,
    pub test_mode: TestModeConfig,
}

#[derive(Debug, Clone)]
pub struct TestModeConfig {
    pub enabled: bool,
    pub trigger_delay_minutes: i64,
    pub retain_failed_reservations: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let timezone = env::var("VENUE_TIMEZONE")
            .ok()
            .and_then(|v| v.parse::<Tz>().ok())
            .unwrap_or_else(|| {
                warn!("VENUE_TIMEZONE not set or invalid, defaulting to America/Guatemala");
                chrono_tz::America::Guatemala
            });

        let courts = env::var("COURTS")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse::<u32>().ok())
                    .collect::<Vec<_>>()
            })
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| {
                warn!("COURTS not set, defaulting to courts 1-3");
                vec![1, 2, 3]
            });

        let settings = Self {
            timezone,
            courts,
            booking_window_hours: env_i64("BOOKING_WINDOW_HOURS", 48),
            poll_interval_seconds: env_u64("POLL_INTERVAL_SECONDS", 15),
            max_retries: env_u32("MAX_RETRIES", 10),
            attempt_budget_seconds: env_u64("ATTEMPT_BUDGET_SECONDS", 85),
            recovery_timeout_seconds: env_u64("RECOVERY_TIMEOUT_SECONDS", 60),
            max_recovery_attempts: env_u32("MAX_RECOVERY_ATTEMPTS", 3),
            production_mode: env_bool("PRODUCTION_MODE", true),
            test_mode: TestModeConfig {
                enabled: env_bool("TEST_MODE_ENABLED", false),
                trigger_delay_minutes: env_i64("TEST_MODE_TRIGGER_DELAY_MINUTES", 2),
                retain_failed_reservations: env_bool("TEST_MODE_RETAIN_FAILED", false),
            },
        };

        if settings.test_mode.enabled {
            warn!(
                "test_mode is enabled - reservations schedule {} minute(s) ahead instead of {}h prior",
                settings.test_mode.trigger_delay_minutes, settings.booking_window_hours
            );
        }

        settings
    }

    /// Dispatch wall-clock budget per attempt, per spec §5 Timeouts.
    pub fn dispatch_timeout_seconds(&self) -> u64 {
        self.attempt_budget_seconds.min(60)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
