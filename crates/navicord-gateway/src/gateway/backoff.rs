//! Reconnection delay policy.

use std::time::Duration;

use navicord_config::schema::BackoffConfig;

const MIN_FACTOR: f64 = 1.5;
const MAX_FACTOR: f64 = 2.0;

/// Delay slept before each connection attempt.
///
/// Grows by `factor` on every failed attempt up to `max`, and drops back
/// to `initial` once a session reaches Ready.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: f64,
    factor: f64,
    max: f64,
    current: f64,
}

/// `value` unless it is NaN or infinite.
fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

impl Backoff {
    /// Build from `config`. Non-finite values fall back to the defaults.
    pub fn new(config: &BackoffConfig) -> Self {
        let defaults = BackoffConfig::default();
        let max = finite_or(config.max_secs, defaults.max_secs).max(0.0);
        let initial = finite_or(config.initial_secs, defaults.initial_secs).clamp(0.0, max);
        let factor = finite_or(config.factor, defaults.factor).clamp(MIN_FACTOR, MAX_FACTOR);
        Self {
            initial,
            factor,
            max,
            current: initial,
        }
    }

    pub fn current(&self) -> Duration {
        Duration::try_from_secs_f64(self.current).unwrap_or(Duration::MAX)
    }

    /// Grow the delay after a failed attempt and return the new value.
    pub fn record_failure(&mut self) -> Duration {
        self.current = (self.current * self.factor).min(self.max);
        self.current()
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(&BackoffConfig::default())
    }
}
