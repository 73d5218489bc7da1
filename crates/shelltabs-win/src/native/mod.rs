//! Thin, safe seam over the Win32 window calls the engine needs.
//!
//! Components depend on [`WindowOps`] rather than on Win32 directly so
//! the host state machine, candidate filter and sweep logic can run
//! against a fake in tests.

#[cfg(windows)]
pub mod win32;

use shelltabs_core::geometry::Rect;
use shelltabs_core::registry::types::Hwnd;

/// Style bit marking a window as a child of its parent.
pub const WS_CHILD: u32 = 0x4000_0000;
/// Style bit for popup windows; mutually exclusive with `WS_CHILD`.
pub const WS_POPUP: u32 = 0x8000_0000;
/// Extended style bit marking a tool window (floating palettes etc.).
pub const WS_EX_TOOLWINDOW: u32 = 0x0000_0080;

/// Safe surface over the native window calls the engine performs.
///
/// Every method is a benign no-op or `None`/`false` when the handle is
/// already gone; a window can die between being observed and being acted
/// upon, and that must never surface as an error.
pub trait WindowOps: Send + Sync {
    /// Whether the handle still refers to a live window.
    fn is_alive(&self, hwnd: Hwnd) -> bool;

    fn is_visible(&self, hwnd: Hwnd) -> bool;

    /// Owner window, or 0 for an unowned top-level window.
    fn owner(&self, hwnd: Hwnd) -> Hwnd;

    /// Window title, or `None` when it cannot be resolved.
    fn title(&self, hwnd: Hwnd) -> Option<String>;

    /// Native window class name.
    fn class_name(&self, hwnd: Hwnd) -> Option<String>;

    /// Full path of the owning process's executable.
    fn process_path(&self, hwnd: Hwnd) -> Option<std::path::PathBuf>;

    /// Window style bits (`GWL_STYLE`).
    fn style(&self, hwnd: Hwnd) -> u32;

    fn set_style(&self, hwnd: Hwnd, style: u32);

    /// Extended style bits (`GWL_EXSTYLE`).
    fn ex_style(&self, hwnd: Hwnd) -> u32;

    /// Current parent, or 0 for a top-level window.
    fn parent(&self, hwnd: Hwnd) -> Hwnd;

    /// Reparent `hwnd` under `parent` (0 restores top-level). Returns
    /// whether the move took effect.
    fn set_parent(&self, hwnd: Hwnd, parent: Hwnd) -> bool;

    /// Screen-space bounds of the window.
    fn bounds(&self, hwnd: Hwnd) -> Option<Rect>;

    fn set_bounds(&self, hwnd: Hwnd, rect: Rect);

    fn show(&self, hwnd: Hwnd);

    fn hide(&self, hwnd: Hwnd);

    /// Bring the window to the foreground.
    fn activate(&self, hwnd: Hwnd);

    /// Bounding rectangle of the virtual screen (all monitors).
    fn virtual_screen(&self) -> Rect;

    /// One-shot enumeration of current top-level windows.
    fn enumerate_top_level(&self) -> Vec<Hwnd>;

    /// Whether the window carries the tool-window extended style.
    fn is_tool_window(&self, hwnd: Hwnd) -> bool {
        self.ex_style(hwnd) & WS_EX_TOOLWINDOW != 0
    }
}
