use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::groups::GroupId;
use crate::registry::types::Hwnd;

/// Default capacity of the event bus ring buffer. Slow subscribers that
/// fall further behind than this lose the oldest events (`Lagged`).
const EVENT_BUS_CAPACITY: usize = 256;

/// State changes the core exposes to external collaborators.
///
/// Each variant describes _what happened_, not what should happen. UI
/// refresh and persistence triggers both hang off this stream. Events use
/// owned types so they can be serialized, stored, and sent across
/// boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoreEvent {
    /// A window passed the candidate filter and entered the registry.
    WindowCreated { hwnd: Hwnd, title: String },
    /// A window left the registry (destroy notification or reap sweep).
    WindowDestroyed { hwnd: Hwnd },
    /// A registered window came to the foreground.
    WindowActivated { hwnd: Hwnd },

    /// A new group was created (explicitly or by auto-grouping).
    GroupCreated { group_id: GroupId, name: String },
    /// A group lost its last member and was cleaned up, or was disbanded.
    GroupDisbanded { group_id: GroupId },
    /// A window joined a group.
    TabAdded { group_id: GroupId, hwnd: Hwnd },
    /// A window left a group.
    TabRemoved { group_id: GroupId, hwnd: Hwnd },
    /// The visible tab of a host changed.
    TabSwitched { group_id: GroupId, hwnd: Hwnd },
}

/// Broadcast fan-out for [`CoreEvent`]s.
///
/// Cheap to clone; every component that mutates state holds one and emits
/// into it. Subscribers (UI refresh, persistence triggers, tests) each get
/// an independent receiver.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all current subscribers.
    ///
    /// An event with no subscribers is dropped silently; the core never
    /// depends on anyone listening.
    pub fn emit(&self, event: CoreEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_roundtrip() {
        let event = CoreEvent::WindowCreated {
            hwnd: 0x20304,
            title: "Downloads".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_all_event_variants_serialize() {
        let group_id = GroupId::new();
        let events = vec![
            CoreEvent::WindowCreated {
                hwnd: 1,
                title: "Documents".to_string(),
            },
            CoreEvent::WindowDestroyed { hwnd: 1 },
            CoreEvent::WindowActivated { hwnd: 1 },
            CoreEvent::GroupCreated {
                group_id,
                name: "work".to_string(),
            },
            CoreEvent::GroupDisbanded { group_id },
            CoreEvent::TabAdded { group_id, hwnd: 1 },
            CoreEvent::TabRemoved { group_id, hwnd: 1 },
            CoreEvent::TabSwitched { group_id, hwnd: 1 },
        ];
        for event in events {
            assert!(
                serde_json::to_string(&event).is_ok(),
                "Failed to serialize: {:?}",
                event
            );
        }
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.emit(CoreEvent::WindowDestroyed { hwnd: 7 });
        let received = rx.recv().await.unwrap();
        assert_eq!(received, CoreEvent::WindowDestroyed { hwnd: 7 });
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.emit(CoreEvent::WindowDestroyed { hwnd: 7 });
    }
}
