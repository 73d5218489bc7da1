use std::time::Duration;

/// Exponent cap: beyond six consecutive failures the delay stops growing
/// on its own and is limited only by `max`.
const MAX_SHIFT: u32 = 6;

/// Exponential backoff delay generator.
///
/// Each call to [`BackoffDelay::next_delay`] returns `min * 2^n` capped at
/// `max`, where `n` is the number of failures recorded so far, then bumps
/// the counter. [`BackoffDelay::reset`] zeroes the counter after a
/// successful recovery.
#[derive(Debug)]
pub struct BackoffDelay {
    min: Duration,
    max: Duration,
    failures: u32,
}

impl BackoffDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            failures: 0,
        }
    }

    /// Delay to sleep before the next recovery attempt.
    pub fn next_delay(&mut self) -> Duration {
        let shift = self.failures.min(MAX_SHIFT);
        let delay = self
            .min
            .checked_mul(1u32 << shift)
            .map_or(self.max, |d| d.min(self.max));
        self.failures = self.failures.saturating_add(1);
        delay
    }

    /// Number of failures recorded since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
