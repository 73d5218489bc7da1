use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::events::{CoreEvent, EventBus};
use crate::groups::types::{Group, GroupId};
use crate::registry::types::Hwnd;

/// Paired maps guarded by one lock so membership moves are atomic.
///
/// Invariant: `membership[h] == g` if and only if `groups[g].members`
/// contains `h`. No orphan membership in either direction.
#[derive(Debug, Default)]
struct GroupsInner {
    groups: HashMap<GroupId, Group>,
    membership: HashMap<Hwnd, GroupId>,
}

/// Owns group lifecycle and the handle↔group mapping.
///
/// Accessed concurrently from the reconciliation worker (auto-grouping),
/// UI-driven calls and the IPC accept loop; every operation takes the one
/// internal lock for the duration of its whole update so a window is never
/// observable in two groups.
pub struct GroupManager {
    inner: Mutex<GroupsInner>,
    events: EventBus,
    /// When set, every removal is followed by an empty-group cleanup pass.
    auto_close_empty: bool,
}

impl GroupManager {
    pub fn new(events: EventBus, auto_close_empty: bool) -> Self {
        Self {
            inner: Mutex::new(GroupsInner::default()),
            events,
            auto_close_empty,
        }
    }

    /// Create a new empty group. Always succeeds.
    pub fn create(&self, name: impl Into<String>) -> GroupId {
        let group = Group::new(name);
        let id = group.id;
        let name = group.name.clone();
        self.inner.lock().groups.insert(id, group);
        info!(event = "core.groups.created", group_id = %id, name = %name);
        self.events.emit(CoreEvent::GroupCreated { group_id: id, name });
        id
    }

    /// Add a window to a group.
    ///
    /// If the window belongs to a different group it is moved atomically:
    /// removed from the old member list and appended to the new one under
    /// a single lock acquisition. Re-adding to its current group is a
    /// successful no-op. Returns `false` only when `group_id` is unknown.
    pub fn add(&self, group_id: GroupId, hwnd: Hwnd) -> bool {
        let mut removed_from: Option<GroupId> = None;
        let mut emptied: Vec<GroupId> = Vec::new();
        {
            let mut inner = self.inner.lock();
            if !inner.groups.contains_key(&group_id) {
                return false;
            }

            match inner.membership.get(&hwnd).copied() {
                Some(current) if current == group_id => return true,
                Some(current) => {
                    if let Some(old) = inner.groups.get_mut(&current) {
                        old.members.retain(|&h| h != hwnd);
                    }
                    removed_from = Some(current);
                }
                None => {}
            }

            inner.membership.insert(hwnd, group_id);
            if let Some(group) = inner.groups.get_mut(&group_id) {
                group.members.push(hwnd);
            }

            // Cleanup runs only when the add displaced a membership; a
            // plain add must not sweep unrelated empty groups.
            if self.auto_close_empty && removed_from.is_some() {
                emptied = Self::drop_empty_locked(&mut inner);
            }
        }

        if let Some(old) = removed_from {
            debug!(event = "core.groups.member_moved", hwnd = hwnd, from = %old, to = %group_id);
            self.events.emit(CoreEvent::TabRemoved {
                group_id: old,
                hwnd,
            });
        }
        self.events.emit(CoreEvent::TabAdded { group_id, hwnd });
        self.emit_disbanded(emptied);
        true
    }

    /// Remove a window from whatever group holds it.
    ///
    /// Returns `false` if the window was not grouped.
    pub fn remove(&self, hwnd: Hwnd) -> bool {
        let mut emptied: Vec<GroupId> = Vec::new();
        let group_id = {
            let mut inner = self.inner.lock();
            let Some(group_id) = inner.membership.remove(&hwnd) else {
                return false;
            };
            if let Some(group) = inner.groups.get_mut(&group_id) {
                group.members.retain(|&h| h != hwnd);
            }
            if self.auto_close_empty {
                emptied = Self::drop_empty_locked(&mut inner);
            }
            group_id
        };

        self.events.emit(CoreEvent::TabRemoved { group_id, hwnd });
        self.emit_disbanded(emptied);
        true
    }

    /// Remove every group with zero members.
    ///
    /// Returns the number of groups removed.
    pub fn cleanup_empty_groups(&self) -> usize {
        let emptied = {
            let mut inner = self.inner.lock();
            Self::drop_empty_locked(&mut inner)
        };
        let count = emptied.len();
        self.emit_disbanded(emptied);
        count
    }

    /// Disband a group explicitly, releasing all its members.
    pub fn disband(&self, group_id: GroupId) -> bool {
        let members = {
            let mut inner = self.inner.lock();
            let Some(group) = inner.groups.remove(&group_id) else {
                return false;
            };
            for hwnd in &group.members {
                inner.membership.remove(hwnd);
            }
            group.members
        };

        for hwnd in members {
            self.events.emit(CoreEvent::TabRemoved { group_id, hwnd });
        }
        info!(event = "core.groups.disbanded", group_id = %group_id);
        self.events.emit(CoreEvent::GroupDisbanded { group_id });
        true
    }

    pub fn group_of(&self, hwnd: Hwnd) -> Option<GroupId> {
        self.inner.lock().membership.get(&hwnd).copied()
    }

    pub fn get(&self, group_id: GroupId) -> Option<Group> {
        self.inner.lock().groups.get(&group_id).cloned()
    }

    /// Find a group by display name. Names are labels, not identities;
    /// the first match in iteration order is returned.
    pub fn find_by_name(&self, name: &str) -> Option<GroupId> {
        self.inner
            .lock()
            .groups
            .values()
            .find(|g| g.name == name)
            .map(|g| g.id)
    }

    pub fn members(&self, group_id: GroupId) -> Vec<Hwnd> {
        self.inner
            .lock()
            .groups
            .get(&group_id)
            .map(|g| g.members.clone())
            .unwrap_or_default()
    }

    /// Snapshot of all groups for persistence.
    pub fn snapshot(&self) -> Vec<Group> {
        self.inner.lock().groups.values().cloned().collect()
    }

    pub fn record_bounds(&self, group_id: GroupId, bounds: crate::geometry::Rect) {
        if let Some(group) = self.inner.lock().groups.get_mut(&group_id) {
            group.saved_bounds = Some(bounds);
        }
    }

    pub fn record_active_index(&self, group_id: GroupId, index: usize) {
        if let Some(group) = self.inner.lock().groups.get_mut(&group_id) {
            group.active_index = index;
        }
    }

    fn drop_empty_locked(inner: &mut GroupsInner) -> Vec<GroupId> {
        let emptied: Vec<GroupId> = inner
            .groups
            .values()
            .filter(|g| g.is_empty())
            .map(|g| g.id)
            .collect();
        for id in &emptied {
            inner.groups.remove(id);
        }
        emptied
    }

    fn emit_disbanded(&self, emptied: Vec<GroupId>) {
        for group_id in emptied {
            info!(event = "core.groups.empty_group_removed", group_id = %group_id);
            self.events.emit(CoreEvent::GroupDisbanded { group_id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(auto_close: bool) -> GroupManager {
        GroupManager::new(EventBus::new(), auto_close)
    }

    #[test]
    fn test_create_always_succeeds() {
        let mgr = manager(false);
        let a = mgr.create("work");
        let b = mgr.create("work");
        assert_ne!(a, b, "same name, distinct identities");
    }

    #[test]
    fn test_add_to_unknown_group_fails() {
        let mgr = manager(false);
        assert!(!mgr.add(GroupId::new(), 1));
        assert_eq!(mgr.group_of(1), None);
    }

    #[test]
    fn test_add_and_membership_are_consistent() {
        let mgr = manager(false);
        let group = mgr.create("work");
        assert!(mgr.add(group, 1));
        assert_eq!(mgr.group_of(1), Some(group));
        assert_eq!(mgr.members(group), vec![1]);
    }

    #[test]
    fn test_readd_to_same_group_is_noop() {
        let mgr = manager(false);
        let group = mgr.create("work");
        assert!(mgr.add(group, 1));
        assert!(mgr.add(group, 1));
        assert_eq!(mgr.members(group), vec![1], "no duplicate membership");
    }

    #[test]
    fn test_add_moves_window_between_groups_atomically() {
        let mgr = manager(false);
        let first = mgr.create("first");
        let second = mgr.create("second");

        assert!(mgr.add(first, 1));
        assert!(mgr.add(second, 1));

        // Member of exactly the second group, absent from the first.
        assert_eq!(mgr.group_of(1), Some(second));
        assert!(mgr.members(first).is_empty());
        assert_eq!(mgr.members(second), vec![1]);
    }

    #[test]
    fn test_remove_ungrouped_returns_false() {
        let mgr = manager(false);
        assert!(!mgr.remove(42));
    }

    #[test]
    fn test_remove_clears_both_maps() {
        let mgr = manager(false);
        let group = mgr.create("work");
        mgr.add(group, 1);
        assert!(mgr.remove(1));
        assert_eq!(mgr.group_of(1), None);
        assert!(mgr.members(group).is_empty());
    }

    #[test]
    fn test_cleanup_removes_only_empty_groups() {
        let mgr = manager(false);
        let empty = mgr.create("empty");
        let full = mgr.create("full");
        mgr.add(full, 1);

        assert_eq!(mgr.cleanup_empty_groups(), 1);
        assert!(mgr.get(empty).is_none());
        assert!(mgr.get(full).is_some());
        assert_eq!(mgr.members(full), vec![1]);
    }

    #[test]
    fn test_auto_close_policy_runs_after_removal() {
        let mgr = manager(true);
        let group = mgr.create("work");
        mgr.add(group, 1);
        mgr.remove(1);
        assert!(mgr.get(group).is_none(), "emptied group is cleaned up");
    }

    #[test]
    fn test_auto_close_policy_runs_after_move() {
        let mgr = manager(true);
        let first = mgr.create("first");
        let second = mgr.create("second");
        mgr.add(first, 1);
        mgr.add(second, 1);
        assert!(mgr.get(first).is_none(), "group emptied by a move is cleaned up");
        assert!(mgr.get(second).is_some());
    }

    #[test]
    fn test_disband_releases_members() {
        let mgr = manager(false);
        let group = mgr.create("work");
        mgr.add(group, 1);
        mgr.add(group, 2);

        assert!(mgr.disband(group));
        assert_eq!(mgr.group_of(1), None);
        assert_eq!(mgr.group_of(2), None);
        assert!(mgr.get(group).is_none());
    }

    #[test]
    fn test_member_order_follows_insertion() {
        let mgr = manager(false);
        let group = mgr.create("work");
        mgr.add(group, 3);
        mgr.add(group, 1);
        mgr.add(group, 2);
        assert_eq!(mgr.members(group), vec![3, 1, 2]);
    }

    #[test]
    fn test_events_emitted_on_move() {
        let bus = EventBus::new();
        let mgr = GroupManager::new(bus.clone(), false);
        let first = mgr.create("first");
        let second = mgr.create("second");
        mgr.add(first, 1);

        let mut rx = bus.subscribe();
        mgr.add(second, 1);

        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::TabRemoved {
                group_id: first,
                hwnd: 1
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::TabAdded {
                group_id: second,
                hwnd: 1
            }
        );
    }

    #[test]
    fn test_find_by_name() {
        let mgr = manager(false);
        let group = mgr.create("files");
        assert_eq!(mgr.find_by_name("files"), Some(group));
        assert_eq!(mgr.find_by_name("missing"), None);
    }
}
