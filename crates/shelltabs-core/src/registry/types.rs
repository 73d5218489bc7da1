use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Native window handle.
///
/// Opaque, process-scoped, and reused by the OS after destruction: valid
/// as an identity key only within one monitoring epoch. Anything holding a
/// handle across a liveness boundary must re-probe before trusting it.
pub type Hwnd = isize;

/// Which event source reported a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Global window-manager event hooks. Fires for every top-level window.
    Generic,
    /// Shell object-model notifications. Fires only for file-manager
    /// windows, and only once the shell process has finished initializing.
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Unknown,
    Visible,
    Hidden,
    Destroyed,
}

/// Resolved payload of a "window created" notification.
///
/// Sources resolve title/class/process before handing the event to the
/// registry so hook callbacks never block on cross-process calls.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWindow {
    pub hwnd: Hwnd,
    pub title: String,
    pub class_name: String,
    pub process_path: PathBuf,
}

/// The fields auto-grouping rules and restart re-matching evaluate against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub title: String,
    pub class_name: String,
    pub process_path: PathBuf,
}

impl WindowDescriptor {
    /// Final path component of the owning executable, lowercased.
    ///
    /// Splits on both separator styles: persisted snapshots may carry
    /// backslash paths while `PathBuf::file_name` only understands the
    /// host platform's separator.
    pub fn process_name(&self) -> String {
        let lossy = self.process_path.to_string_lossy();
        lossy
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Canonical registry entry for one tracked window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub hwnd: Hwnd,
    pub title: String,
    pub class_name: String,
    pub process_path: PathBuf,
    pub source: SourceKind,
    pub state: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub last_activated_at: Option<DateTime<Utc>>,
}

impl WindowEntry {
    pub fn descriptor(&self) -> WindowDescriptor {
        WindowDescriptor {
            title: self.title.clone(),
            class_name: self.class_name.clone(),
            process_path: self.process_path.clone(),
        }
    }
}
