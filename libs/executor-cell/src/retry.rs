use std::time::Duration;

use chrono::{DateTime, Utc};

/// Bounded retry policy applied to the FIND SLOT phase once the booking
/// window has opened (spec.md §4.K). Pre-window polling is unbounded and
/// lives in [`crate::executor::BookingExecutor::pre_window_wait`]; it never
/// counts against this budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Guard delay between retries while still before the target play time
    /// (spec.md: "~100ms guard").
    pub immediate_retry_guard: Duration,
    /// Delay between retries once the target play time has passed
    /// (spec.md: "default 2s").
    pub post_target_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            immediate_retry_guard: Duration::from_millis(100),
            post_target_delay: Duration::from_secs(2),
        }
    }

    /// Delay to sleep before the next FIND SLOT retry.
    pub fn delay_before_retry(&self, now: DateTime<Utc>, target_play_time: DateTime<Utc>) -> Duration {
        if now < target_play_time {
            self.immediate_retry_guard
        } else {
            self.post_target_delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn retries_fast_before_target_play_time() {
        let policy = RetryPolicy::new(10);
        let now = Utc::now();
        let target = now + ChronoDuration::seconds(30);
        assert_eq!(policy.delay_before_retry(now, target), Duration::from_millis(100));
    }

    #[test]
    fn retries_slow_after_target_play_time() {
        let policy = RetryPolicy::new(10);
        let now = Utc::now();
        let target = now - ChronoDuration::seconds(1);
        assert_eq!(policy.delay_before_retry(now, target), Duration::from_secs(2));
    }
}
