//! Bounded polling policy for asynchronous Dropbox jobs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often, and how many times, a pending job is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Status checks before the job is considered timed out.
    pub max_attempts: u32,
    /// Delay before the first check.
    pub interval_ms: u64,
    /// Growth factor per attempt; `1.0` keeps the interval fixed.
    pub backoff_multiplier: f64,
    /// Upper bound for a grown interval.
    pub max_interval_ms: Option<u64>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            interval_ms: 600,
            backoff_multiplier: 1.0,
            max_interval_ms: None,
        }
    }
}

impl PollPolicy {
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            backoff_multiplier: 1.0,
            max_interval_ms: None,
        }
    }

    /// Delay to wait before the zero-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = if self.backoff_multiplier.is_finite() && self.backoff_multiplier > 1.0 {
            self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32)
        } else {
            1.0
        };
        let mut ms = (self.interval_ms as f64 * factor).min(u64::MAX as f64) as u64;
        if let Some(cap) = self.max_interval_ms {
            ms = ms.min(cap);
        }
        Duration::from_millis(ms)
    }

    /// Sum of all delays across the full budget.
    pub fn total_budget(&self) -> Duration {
        (0..self.max_attempts).map(|a| self.delay_for(a)).sum()
    }
}

/// Suspends the current task between polls.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
