use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::events::{CoreEvent, EventBus};
use crate::registry::debounce::VisibilityDebouncer;
use crate::registry::types::{
    Hwnd, LifecycleState, SourceKind, SourceWindow, WindowDescriptor, WindowEntry,
};

/// Reconciles events from both window sources into one canonical map.
///
/// Entries are mutated only here. Both sources may report the same handle;
/// the shell source's metadata wins for the windows it covers (it reads
/// titles from the shell object model, which is authoritative for
/// file-manager windows), while lifecycle state always follows the most
/// recent event regardless of source.
///
/// The map is a concurrent structure because writers live on the hook
/// callback forwarding thread, the shell watcher task and the IPC accept
/// loop, with no single owner.
pub struct WindowRegistry {
    entries: DashMap<Hwnd, WindowEntry>,
    debouncer: Arc<VisibilityDebouncer>,
    events: EventBus,
}

impl WindowRegistry {
    pub fn new(events: EventBus, debounce_window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            debouncer: Arc::new(VisibilityDebouncer::new(debounce_window)),
            events,
        }
    }

    /// Shared show/hide gate.
    ///
    /// Hosts route their visibility changes through this so suppression
    /// windows and destroy-time cleanup cover every requester of a
    /// handle, not just one.
    pub fn visibility_gate(&self) -> Arc<VisibilityDebouncer> {
        self.debouncer.clone()
    }

    /// Apply a "created" notification from either source.
    ///
    /// Not every create notification corresponds to a user-meaningful
    /// window; a window whose title cannot be resolved is discarded.
    pub fn on_created(&self, source: SourceKind, window: SourceWindow) {
        if window.title.trim().is_empty() {
            debug!(
                event = "core.registry.titleless_create_discarded",
                hwnd = window.hwnd,
                source = ?source,
            );
            return;
        }

        match self.entries.entry(window.hwnd) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                // Same handle seen by both sources: keep shell metadata
                // unless the shell entry is the one being refreshed.
                let metadata_wins =
                    source == SourceKind::Shell || entry.source != SourceKind::Shell;
                if metadata_wins {
                    entry.title = window.title;
                    entry.class_name = window.class_name;
                    entry.process_path = window.process_path;
                    entry.source = source;
                }
                // State follows the most recent event from either source.
                entry.state = LifecycleState::Visible;
            }
            Entry::Vacant(vacant) => {
                let title = window.title.clone();
                vacant.insert(WindowEntry {
                    hwnd: window.hwnd,
                    title: window.title,
                    class_name: window.class_name,
                    process_path: window.process_path,
                    source,
                    state: LifecycleState::Visible,
                    created_at: Utc::now(),
                    last_activated_at: None,
                });
                debug!(
                    event = "core.registry.window_registered",
                    hwnd = window.hwnd,
                    source = ?source,
                );
                self.events.emit(CoreEvent::WindowCreated {
                    hwnd: window.hwnd,
                    title,
                });
            }
        }
    }

    /// Apply a "destroyed" notification from either source.
    ///
    /// An unknown handle is a benign no-op: the other source, or the reap
    /// sweep, got there first.
    pub fn on_destroyed(&self, source: SourceKind, hwnd: Hwnd) {
        if self.entries.remove(&hwnd).is_some() {
            self.debouncer.forget(hwnd);
            debug!(
                event = "core.registry.window_removed",
                hwnd = hwnd,
                source = ?source,
            );
            self.events.emit(CoreEvent::WindowDestroyed { hwnd });
        }
    }

    /// Apply a "foreground changed" notification.
    ///
    /// Unregistered handles are ignored; focus moves through plenty of
    /// windows the registry does not track.
    pub fn on_foreground(&self, _source: SourceKind, hwnd: Hwnd) {
        if let Some(mut entry) = self.entries.get_mut(&hwnd) {
            entry.last_activated_at = Some(Utc::now());
            self.events.emit(CoreEvent::WindowActivated { hwnd });
        }
    }

    /// Record a lifecycle state observed outside the create/destroy flow
    /// (host show/hide actions, sweep findings).
    pub fn set_state(&self, hwnd: Hwnd, state: LifecycleState) {
        if let Some(mut entry) = self.entries.get_mut(&hwnd) {
            entry.state = state;
        }
    }

    pub fn get(&self, hwnd: Hwnd) -> Option<WindowEntry> {
        self.entries.get(&hwnd).map(|e| e.clone())
    }

    pub fn descriptor(&self, hwnd: Hwnd) -> Option<WindowDescriptor> {
        self.entries.get(&hwnd).map(|e| e.descriptor())
    }

    pub fn contains(&self, hwnd: Hwnd) -> bool {
        self.entries.contains_key(&hwnd)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, most recently activated first.
    pub fn windows_by_recency(&self) -> Vec<WindowEntry> {
        let mut windows: Vec<WindowEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        windows.sort_by(|a, b| b.last_activated_at.cmp(&a.last_activated_at));
        windows
    }
}
