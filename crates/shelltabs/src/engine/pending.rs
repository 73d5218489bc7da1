//! Pending-open bookkeeping.
//!
//! Between asking the shell to open a folder and the new window's create
//! notification there is no handle to correlate with, so intercepted
//! requests park here and are claimed by title when the window appears.
//! Entries expire after a short TTL; a failed open must not capture some
//! unrelated window minutes later.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use shelltabs_core::groups::GroupId;

#[derive(Debug, Clone)]
struct PendingOpen {
    path: String,
    target: Option<GroupId>,
    requested_at: Instant,
}

#[derive(Debug)]
pub struct PendingOpens {
    entries: Mutex<Vec<PendingOpen>>,
    ttl: Duration,
}

impl PendingOpens {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            ttl,
        }
    }

    /// Park a request until its window shows up.
    pub fn push(&self, path: &str, target: Option<GroupId>) {
        self.entries.lock().push(PendingOpen {
            path: path.to_string(),
            target,
            requested_at: Instant::now(),
        });
    }

    /// Claim the pending request a freshly-created window belongs to.
    ///
    /// A window claims a request when its title equals the requested
    /// folder's display name or the full requested path. Returns the
    /// request's target group (`None` inside means "no group preference")
    /// or `None` when nothing matches.
    pub fn claim(&self, title: &str) -> Option<Option<GroupId>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        entries.retain(|e| now.duration_since(e.requested_at) <= self.ttl);

        let index = entries.iter().position(|e| {
            title.eq_ignore_ascii_case(folder_display_name(&e.path))
                || title.eq_ignore_ascii_case(&e.path)
        })?;
        Some(entries.remove(index).target)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Last non-empty path component, with both separator styles honored.
pub fn folder_display_name(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}
