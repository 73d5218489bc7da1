use shelltabs_core::geometry::Rect;
use shelltabs_core::registry::types::Hwnd;

/// Per-tab state machine.
///
/// `Detached` is terminal for a tab; the record is dropped right after
/// the restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    AttachedHidden,
    AttachedVisible,
    Detached,
}

/// Everything needed to restore a window to an independent top-level
/// window: captured immediately before the reparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentRecord {
    pub parent: Hwnd,
    pub style: u32,
    pub bounds: Rect,
}

/// One hosted window and its restore record.
#[derive(Debug, Clone)]
pub struct HostTab {
    pub hwnd: Hwnd,
    pub original: ReparentRecord,
    pub state: TabState,
}

/// Presentation collaborator: the container window tabs are hosted in.
///
/// The core only ever asks for the handle and the client area; rendering
/// the tab strip, sizing the container, and forwarding close-control
/// clicks are the presentation layer's business.
pub trait HostContainer: Send + Sync {
    fn handle(&self) -> Hwnd;

    /// Current client area in screen coordinates; the visible tab is
    /// resized to fill it.
    fn client_area(&self) -> Rect;
}
