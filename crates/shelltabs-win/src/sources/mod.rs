//! Window event sources.
//!
//! Two independent producers feed the registry: the generic WinEvent hook
//! source (every top-level window) and the shell watcher (file-manager
//! windows only). The registry is agnostic to which variant produced an
//! event; both are reduced to the same small notification shapes here.

pub mod generic;
pub mod shell_watcher;

pub use generic::GenericSource;
pub use shell_watcher::{ShellNotification, ShellWatcher, ShellWatcherConfig};

use shelltabs_core::registry::types::{Hwnd, SourceWindow};

use crate::native::WindowOps;

/// Raw notification from the generic hook source, before resolution.
///
/// Hook callbacks run on the message-pump thread and must not block on
/// cross-process calls, so they forward only the handle; title, class and
/// process path are resolved later on a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawWindowEvent {
    Created(Hwnd),
    Destroyed(Hwnd),
    Foreground(Hwnd),
}

/// Whether a window is a candidate for tracking: visible, unowned, and
/// not a tool window.
pub fn is_candidate(ops: &dyn WindowOps, hwnd: Hwnd) -> bool {
    ops.is_visible(hwnd) && ops.owner(hwnd) == 0 && !ops.is_tool_window(hwnd)
}

/// Resolve a raw handle into the registry's created-event payload.
///
/// Returns `None` when the window died before resolution or has no
/// title; the registry would discard it anyway.
pub fn resolve_window(ops: &dyn WindowOps, hwnd: Hwnd) -> Option<SourceWindow> {
    if !ops.is_alive(hwnd) {
        return None;
    }
    let title = ops.title(hwnd)?;
    if title.trim().is_empty() {
        return None;
    }
    Some(SourceWindow {
        hwnd,
        title,
        class_name: ops.class_name(hwnd).unwrap_or_default(),
        process_path: ops.process_path(hwnd).unwrap_or_default(),
    })
}
