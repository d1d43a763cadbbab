//! Configuration for planner operations
//!
//! Defines the per-step deadline, the retry policy for remote calls and the
//! anchor year used by the fallback semester classifier.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use trayecto_domain::classifier::DEFAULT_ANCHOR_YEAR;

/// Configuration for the planner
///
/// # Examples
///
/// ```
/// use trayecto_planner::PlannerConfig;
///
/// // Default configuration (15 s deadline, no retries)
/// let config = PlannerConfig::default();
/// assert_eq!(config.step_timeout_secs, 15);
/// assert_eq!(config.max_retries, 0);
///
/// // Patient configuration for slow links
/// let config = PlannerConfig::patient();
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Deadline for a single remote step (in seconds)
    /// Default: 15 seconds
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,

    /// Extra attempts after a failed or timed-out remote step
    /// Default: 0 (no retries)
    #[serde(default)]
    pub max_retries: u32,

    /// Initial backoff between attempts (in milliseconds), doubled each retry
    /// Default: 250 ms
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Year the fallback classifier places unlabeled courses relative to
    /// Default: 2025
    #[serde(default = "default_anchor_year")]
    pub anchor_year: i32,
}

fn default_step_timeout_secs() -> u64 {
    15
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_anchor_year() -> i32 {
    DEFAULT_ANCHOR_YEAR
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: default_step_timeout_secs(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            anchor_year: default_anchor_year(),
        }
    }
}

impl PlannerConfig {
    /// Longer deadline and two retries, for slow or flaky services
    ///
    /// - Step deadline: 30 seconds
    /// - Retries: 2
    /// - Backoff: 500 ms, then 1 s
    pub fn patient() -> Self {
        Self {
            step_timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            anchor_year: default_anchor_year(),
        }
    }

    /// Get the step deadline as Duration
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Get the initial retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
