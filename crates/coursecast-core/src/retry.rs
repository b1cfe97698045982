//! Bounded retry with a fixed delay
//!
//! Used to wait for engine data that arrives without a dedicated signal.
//! Waiting is always a deferred re-invocation: the caller schedules the next
//! attempt after [`RetryBudget::delay`], nothing here blocks.

use std::time::Duration;

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between attempts
    pub delay: Duration,
    /// Total attempts allowed, including the first
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self { delay, max_attempts }
    }

    /// Start a fresh budget
    pub fn budget(&self) -> RetryBudget {
        RetryBudget {
            policy: *self,
            attempts: 0,
        }
    }

    /// Upper bound on time spent waiting between attempts
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

/// Attempts consumed against a [`RetryPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryBudget {
    /// Consume one attempt; `false` once the budget is spent
    pub fn try_attempt(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.attempts += 1;
        true
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// Delay before the next attempt
    pub fn delay(&self) -> Duration {
        self.policy.delay
    }
}
