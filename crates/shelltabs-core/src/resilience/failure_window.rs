use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window failure counter.
///
/// Records failure timestamps and answers "how many failures happened in
/// the last `window`?" Entries older than the queried window are evicted
/// lazily on the next query, so an idle tracker costs nothing.
#[derive(Debug, Default)]
pub struct FailureWindow {
    timestamps: VecDeque<Instant>,
}

impl FailureWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure at the current time.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    /// Count failures within `window` of the current time.
    pub fn count_recent(&mut self, window: Duration) -> usize {
        self.count_recent_at(window, Instant::now())
    }

    /// Drop all recorded failures.
    pub fn clear(&mut self) {
        self.timestamps.clear();
    }

    fn record_at(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    fn count_recent_at(&mut self, window: Duration, now: Instant) -> usize {
        while let Some(&oldest) = self.timestamps.front() {
            if now.duration_since(oldest) > window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        self.timestamps.len()
    }
}
