//! Resilience primitives for flaky native calls.
//!
//! Cross-process window and shell object-model calls fail intermittently
//! when the target process is busy, mid-navigation, or gone. These
//! primitives keep those failures contained: bounded retry for individual
//! calls, exponential backoff for subsystem recovery, and a sliding
//! failure window for circuit-breaker decisions.

mod backoff;
mod failure_window;
mod retry;

pub use backoff::BackoffDelay;
pub use failure_window::FailureWindow;
pub use retry::retry;
