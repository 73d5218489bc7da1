use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::registry::types::WindowDescriptor;

/// Visual state of a host window worth restoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowPlacement {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// Handle-free identity of a window, used to re-match across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowIdentity {
    pub process_name: String,
    pub title: String,
    pub class_name: String,
    pub process_path: String,
}

impl WindowIdentity {
    pub fn from_descriptor(descriptor: &WindowDescriptor) -> Self {
        Self {
            process_name: descriptor.process_name(),
            title: descriptor.title.clone(),
            class_name: descriptor.class_name.clone(),
            process_path: descriptor.process_path.to_string_lossy().into_owned(),
        }
    }
}

/// Persisted snapshot of one group: host bounds/visual state plus the
/// ordered identities of its member windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupWindowState {
    pub group_name: String,
    pub bounds: Rect,
    #[serde(default)]
    pub placement: WindowPlacement,
    #[serde(default)]
    pub active_index: usize,
    pub windows: Vec<WindowIdentity>,
    pub saved_at: DateTime<Utc>,
}
