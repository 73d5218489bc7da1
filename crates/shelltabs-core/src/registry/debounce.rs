use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::registry::types::Hwnd;

#[derive(Debug, Default, Clone, Copy)]
struct VisibilityStamps {
    last_show: Option<Instant>,
    last_hide: Option<Instant>,
}

/// Per-handle show/hide debouncer.
///
/// Rapid tab switching and duplicate notifications from the two event
/// sources produce bursts of show/hide requests for the same handle;
/// applying them all makes the hosted window flicker. A request repeated
/// within the configured window is suppressed. Show and hide are tracked
/// with independent timestamps so a show immediately after a hide (a real
/// selection change) always passes.
#[derive(Debug)]
pub struct VisibilityDebouncer {
    stamps: DashMap<Hwnd, VisibilityStamps>,
    window: Duration,
}

impl VisibilityDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            stamps: DashMap::new(),
            window,
        }
    }

    /// Whether a show request for `hwnd` should be applied now.
    pub fn allow_show(&self, hwnd: Hwnd) -> bool {
        self.allow_show_at(hwnd, Instant::now())
    }

    /// Whether a hide request for `hwnd` should be applied now.
    pub fn allow_hide(&self, hwnd: Hwnd) -> bool {
        self.allow_hide_at(hwnd, Instant::now())
    }

    /// Drop the stamps for a destroyed handle.
    ///
    /// Handles are reused by the OS; stale stamps must not suppress the
    /// first show of an unrelated successor window.
    pub fn forget(&self, hwnd: Hwnd) {
        self.stamps.remove(&hwnd);
    }

    fn allow_show_at(&self, hwnd: Hwnd, now: Instant) -> bool {
        let mut entry = self.stamps.entry(hwnd).or_default();
        let allowed = entry
            .last_show
            .is_none_or(|last| now.duration_since(last) >= self.window);
        if allowed {
            entry.last_show = Some(now);
        }
        allowed
    }

    fn allow_hide_at(&self, hwnd: Hwnd, now: Instant) -> bool {
        let mut entry = self.stamps.entry(hwnd).or_default();
        let allowed = entry
            .last_hide
            .is_none_or(|last| now.duration_since(last) >= self.window);
        if allowed {
            entry.last_hide = Some(now);
        }
        allowed
    }
}
