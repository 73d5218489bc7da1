use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Rect;
use crate::registry::types::Hwnd;
use crate::session::types::WindowPlacement;

/// Process-lifetime group identifier.
///
/// Never reused within a run, never persisted as identity (persisted
/// snapshots re-match by window descriptors instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(Uuid);

impl GroupId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One group of windows.
///
/// `members` is ordered: tab order in the host follows insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Display label. Not unique; identity is `id`.
    pub name: String,
    pub members: Vec<Hwnd>,
    pub created_at: DateTime<Utc>,
    /// Saved host bounds/visual state, if this group was restored from or
    /// written to a session snapshot.
    pub saved_bounds: Option<Rect>,
    pub saved_placement: Option<WindowPlacement>,
    pub active_index: usize,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            members: Vec::new(),
            created_at: Utc::now(),
            saved_bounds: None,
            saved_placement: None,
            active_index: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ids_are_unique() {
        assert_ne!(GroupId::new(), GroupId::new());
    }

    #[test]
    fn test_new_group_is_empty() {
        let group = Group::new("work");
        assert!(group.is_empty());
        assert_eq!(group.name, "work");
        assert_eq!(group.active_index, 0);
    }

    #[test]
    fn test_group_serde_roundtrip() {
        let mut group = Group::new("files");
        group.members.push(42);
        let json = serde_json::to_string(&group).unwrap();
        let parsed: Group = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, group);
    }
}
