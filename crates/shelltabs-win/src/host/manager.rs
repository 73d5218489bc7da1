use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use shelltabs_core::events::{CoreEvent, EventBus};
use shelltabs_core::geometry::{clamp_to_virtual_screen, Rect};
use shelltabs_core::groups::GroupId;
use shelltabs_core::registry::types::Hwnd;
use shelltabs_core::registry::VisibilityDebouncer;

use crate::host::types::{HostContainer, HostTab, ReparentRecord, TabState};
use crate::native::{WindowOps, WS_CHILD, WS_POPUP};

#[derive(Debug, Default)]
struct HostInner {
    tabs: Vec<HostTab>,
    selected: Option<Hwnd>,
}

/// One tab host: a container window plus the foreign windows parented
/// into it.
///
/// Attach/detach/select arrive from UI-driven calls and the IPC handler
/// concurrently with the sweep timer; the tab list lives behind one lock
/// and native calls are made outside it.
pub struct TabHost {
    ops: Arc<dyn WindowOps>,
    container: Arc<dyn HostContainer>,
    group_id: GroupId,
    inner: Mutex<HostInner>,
    events: EventBus,
    debouncer: Arc<VisibilityDebouncer>,
}

impl TabHost {
    pub fn new(
        ops: Arc<dyn WindowOps>,
        container: Arc<dyn HostContainer>,
        group_id: GroupId,
        events: EventBus,
        debouncer: Arc<VisibilityDebouncer>,
    ) -> Self {
        Self {
            ops,
            container,
            group_id,
            inner: Mutex::new(HostInner::default()),
            events,
            debouncer,
        }
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Reparent a window into this host.
    ///
    /// Records the window's parent, style and bounds first so a later
    /// [`TabHost::detach`] can restore it bit-for-bit. If the window is
    /// already attached here the call just switches selection. Returns
    /// `false` when the window vanished before it could be moved: a
    /// benign race, not an error.
    pub fn attach(&self, hwnd: Hwnd) -> bool {
        {
            let inner = self.inner.lock();
            if inner.tabs.iter().any(|t| t.hwnd == hwnd) {
                drop(inner);
                return self.select(hwnd);
            }
        }

        let Some(bounds) = self.ops.bounds(hwnd) else {
            debug!(event = "win.host.attach_window_gone", hwnd = hwnd);
            return false;
        };
        let original = ReparentRecord {
            parent: self.ops.parent(hwnd),
            style: self.ops.style(hwnd),
            bounds,
        };

        let child_style = (original.style & !WS_POPUP) | WS_CHILD;
        self.ops.set_style(hwnd, child_style);
        if !self.ops.set_parent(hwnd, self.container.handle()) {
            // Roll the style back; the window stays a free top-level.
            self.ops.set_style(hwnd, original.style);
            debug!(event = "win.host.reparent_failed", hwnd = hwnd);
            return false;
        }
        self.ops.hide(hwnd);

        self.inner.lock().tabs.push(HostTab {
            hwnd,
            original,
            state: TabState::AttachedHidden,
        });
        info!(event = "win.host.tab_attached", hwnd = hwnd, group_id = %self.group_id);
        true
    }

    /// Make `hwnd` the visible tab.
    ///
    /// The previously selected tab is hidden, not destroyed. The new tab
    /// is shown and resized to fill the container's current client area.
    /// Show/hide churn within the debounce window is suppressed; the
    /// sweep re-syncs any visibility skew left behind.
    pub fn select(&self, hwnd: Hwnd) -> bool {
        let previous = {
            let mut inner = self.inner.lock();
            if !inner.tabs.iter().any(|t| t.hwnd == hwnd) {
                return false;
            }
            if inner.selected == Some(hwnd) {
                return true;
            }
            let previous = inner.selected;
            for tab in inner.tabs.iter_mut() {
                if tab.hwnd == hwnd {
                    tab.state = TabState::AttachedVisible;
                } else if tab.state == TabState::AttachedVisible {
                    tab.state = TabState::AttachedHidden;
                }
            }
            inner.selected = Some(hwnd);
            previous
        };

        if let Some(prev) = previous {
            if self.debouncer.allow_hide(prev) {
                self.ops.hide(prev);
            }
        }
        if self.debouncer.allow_show(hwnd) {
            self.ops.show(hwnd);
        }
        self.ops.set_bounds(hwnd, self.container.client_area());

        self.events.emit(CoreEvent::TabSwitched {
            group_id: self.group_id,
            hwnd,
        });
        true
    }

    /// Restore a window to an independent top-level window.
    ///
    /// Returns the restore record that was applied, or `None` if the
    /// window was not attached here.
    pub fn detach(&self, hwnd: Hwnd) -> Option<ReparentRecord> {
        let original = {
            let mut inner = self.inner.lock();
            let index = inner.tabs.iter().position(|t| t.hwnd == hwnd)?;
            let tab = inner.tabs.remove(index);
            if inner.selected == Some(hwnd) {
                inner.selected = None;
            }
            tab.original
        };

        self.ops.set_style(hwnd, original.style);
        self.ops.set_parent(hwnd, original.parent);
        self.ops.set_bounds(hwnd, original.bounds);
        self.ops.show(hwnd);
        info!(event = "win.host.tab_detached", hwnd = hwnd, group_id = %self.group_id);
        Some(original)
    }

    /// Detach every tab; used on shutdown so no window stays trapped in a
    /// dying container.
    pub fn detach_all(&self) -> usize {
        let hwnds: Vec<Hwnd> = self.inner.lock().tabs.iter().map(|t| t.hwnd).collect();
        hwnds
            .into_iter()
            .filter(|&hwnd| self.detach(hwnd).is_some())
            .count()
    }

    /// Liveness sweep.
    ///
    /// A hosted window can vanish without any destroy notification when
    /// its process crashes; this probe is the only signal the host gets.
    /// Dead handles are force-detached, state cleanup only, no restore
    /// attempted since there is nothing left to restore. Live tabs have
    /// their native visibility re-synced to their recorded state.
    ///
    /// Operates on a snapshot of the tab list because attach/detach run
    /// concurrently.
    pub fn sweep(&self) -> Vec<Hwnd> {
        let snapshot: Vec<(Hwnd, TabState)> = {
            let inner = self.inner.lock();
            inner.tabs.iter().map(|t| (t.hwnd, t.state)).collect()
        };

        let mut reaped = Vec::new();
        for (hwnd, state) in snapshot {
            if !self.ops.is_alive(hwnd) {
                reaped.push(hwnd);
                continue;
            }
            match state {
                TabState::AttachedVisible if !self.ops.is_visible(hwnd) => self.ops.show(hwnd),
                TabState::AttachedHidden if self.ops.is_visible(hwnd) => self.ops.hide(hwnd),
                _ => {}
            }
        }

        if !reaped.is_empty() {
            let mut inner = self.inner.lock();
            inner.tabs.retain(|t| !reaped.contains(&t.hwnd));
            if let Some(selected) = inner.selected {
                if reaped.contains(&selected) {
                    inner.selected = None;
                }
            }
            for hwnd in &reaped {
                info!(event = "win.host.dead_tab_reaped", hwnd = hwnd, group_id = %self.group_id);
            }
        }
        reaped
    }

    /// Apply persisted host bounds, clamped to the current virtual screen.
    pub fn apply_saved_bounds(&self, saved: Rect) -> Rect {
        let clamped = clamp_to_virtual_screen(saved, self.ops.virtual_screen());
        self.ops.set_bounds(self.container.handle(), clamped);
        clamped
    }

    pub fn selected(&self) -> Option<Hwnd> {
        self.inner.lock().selected
    }

    pub fn tabs(&self) -> Vec<Hwnd> {
        self.inner.lock().tabs.iter().map(|t| t.hwnd).collect()
    }

    pub fn contains(&self, hwnd: Hwnd) -> bool {
        self.inner.lock().tabs.iter().any(|t| t.hwnd == hwnd)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWindowOps;
    use std::time::Duration;

    struct FakeContainer {
        handle: Hwnd,
        client: Rect,
    }

    impl HostContainer for FakeContainer {
        fn handle(&self) -> Hwnd {
            self.handle
        }

        fn client_area(&self) -> Rect {
            self.client
        }
    }

    const CONTAINER: Hwnd = 1000;

    fn host(ops: Arc<FakeWindowOps>) -> TabHost {
        ops.add_window(CONTAINER, "shelltabs host", true);
        TabHost::new(
            ops,
            Arc::new(FakeContainer {
                handle: CONTAINER,
                client: Rect::new(0, 0, 1200, 800),
            }),
            GroupId::new(),
            EventBus::new(),
            Arc::new(VisibilityDebouncer::new(Duration::ZERO)),
        )
    }

    #[test]
    fn test_attach_records_original_and_hides() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        ops.set_window_bounds(1, Rect::new(50, 60, 700, 500));
        let host = host(ops.clone());

        assert!(host.attach(1));
        assert_eq!(ops.parent(1), CONTAINER);
        assert!(!ops.is_visible(1), "attached tabs start hidden");
        assert!(ops.style(1) & WS_CHILD != 0);
    }

    #[test]
    fn test_attach_dead_window_is_benign() {
        let ops = Arc::new(FakeWindowOps::new());
        let host = host(ops);
        assert!(!host.attach(404));
        assert!(host.is_empty());
    }

    #[test]
    fn test_select_shows_one_tab_and_fills_client_area() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        ops.add_window(2, "Documents", true);
        let host = host(ops.clone());
        host.attach(1);
        host.attach(2);

        assert!(host.select(1));
        assert!(ops.is_visible(1));
        assert!(!ops.is_visible(2));
        assert_eq!(ops.bounds(1).unwrap(), Rect::new(0, 0, 1200, 800));

        assert!(host.select(2));
        assert!(!ops.is_visible(1), "previous tab is hidden, not destroyed");
        assert!(ops.is_visible(2));
        assert_eq!(host.selected(), Some(2));
    }

    #[test]
    fn test_select_unknown_tab_fails() {
        let ops = Arc::new(FakeWindowOps::new());
        let host = host(ops);
        assert!(!host.select(42));
    }

    #[test]
    fn test_attach_of_attached_window_switches_selection() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        ops.add_window(2, "Documents", true);
        let host = host(ops.clone());
        host.attach(1);
        host.attach(2);
        host.select(2);

        assert!(host.attach(1), "re-attach degrades to select");
        assert_eq!(host.selected(), Some(1));
        assert_eq!(host.tabs().len(), 2, "no duplicate tab entry");
    }

    #[test]
    fn test_detach_restores_original_parent_and_bounds() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        ops.set_window_bounds(1, Rect::new(50, 60, 700, 500));
        let original_style = ops.style(1);
        let host = host(ops.clone());

        host.attach(1);
        host.select(1);
        let record = host.detach(1).unwrap();

        assert_eq!(ops.parent(1), 0);
        assert_eq!(ops.bounds(1).unwrap(), Rect::new(50, 60, 700, 500));
        assert_eq!(ops.style(1), original_style);
        assert_eq!(record.bounds, Rect::new(50, 60, 700, 500));
        assert!(host.is_empty());
        assert_eq!(host.selected(), None);
    }

    #[test]
    fn test_detach_unknown_window_is_none() {
        let ops = Arc::new(FakeWindowOps::new());
        let host = host(ops);
        assert!(host.detach(42).is_none());
    }

    #[test]
    fn test_sweep_reaps_dead_handles_without_restore() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        ops.add_window(2, "Documents", true);
        let host = host(ops.clone());
        host.attach(1);
        host.attach(2);
        host.select(1);

        // Process crash: the window vanishes with no destroy notification.
        ops.destroy_window(1);

        let reaped = host.sweep();
        assert_eq!(reaped, vec![1]);
        assert_eq!(host.tabs(), vec![2]);
        assert_eq!(host.selected(), None);
    }

    #[test]
    fn test_sweep_resyncs_visibility_to_state() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        let host = host(ops.clone());
        host.attach(1);
        host.select(1);

        // Something outside the host hid the window.
        ops.set_visible(1, false);
        host.sweep();
        assert!(ops.is_visible(1), "visible tab is re-shown");
    }

    #[test]
    fn test_rapid_switch_churn_is_debounced_then_resynced() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(CONTAINER, "shelltabs host", true);
        ops.add_window(1, "Downloads", true);
        ops.add_window(2, "Documents", true);
        let host = TabHost::new(
            ops.clone(),
            Arc::new(FakeContainer {
                handle: CONTAINER,
                client: Rect::new(0, 0, 1200, 800),
            }),
            GroupId::new(),
            EventBus::new(),
            Arc::new(VisibilityDebouncer::new(Duration::from_secs(10))),
        );
        host.attach(1);
        host.attach(2);

        host.select(1);
        host.select(2);
        // Bouncing straight back: the second show of 1 falls inside the
        // debounce window and is suppressed.
        host.select(1);
        assert_eq!(host.selected(), Some(1));
        assert!(!ops.is_visible(1), "show suppressed by debounce");

        // The sweep re-syncs native visibility to the recorded state.
        host.sweep();
        assert!(ops.is_visible(1));
        assert!(!ops.is_visible(2));
    }

    #[test]
    fn test_detach_all_restores_everything() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.add_window(1, "Downloads", true);
        ops.add_window(2, "Documents", true);
        let host = host(ops.clone());
        host.attach(1);
        host.attach(2);

        assert_eq!(host.detach_all(), 2);
        assert!(host.is_empty());
        assert_eq!(ops.parent(1), 0);
        assert_eq!(ops.parent(2), 0);
    }

    #[test]
    fn test_saved_bounds_are_clamped_to_virtual_screen() {
        let ops = Arc::new(FakeWindowOps::new());
        ops.set_screen(Rect::new(0, 0, 1920, 1080));
        let host = host(ops.clone());

        let applied = host.apply_saved_bounds(Rect::new(5000, 5000, 800, 600));
        assert!(Rect::new(0, 0, 1920, 1080).contains(&applied));
        assert_eq!(ops.bounds(CONTAINER).unwrap(), applied);
    }
}
