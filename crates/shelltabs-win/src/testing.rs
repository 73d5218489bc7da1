//! In-memory [`WindowOps`] fake shared by unit tests.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use shelltabs_core::geometry::Rect;
use shelltabs_core::registry::types::Hwnd;

use crate::native::{WindowOps, WS_EX_TOOLWINDOW};

#[derive(Debug, Clone)]
struct FakeWindow {
    title: String,
    class_name: String,
    process_path: PathBuf,
    visible: bool,
    owner: Hwnd,
    style: u32,
    ex_style: u32,
    parent: Hwnd,
    bounds: Rect,
}

/// Mutable fake window table behind interior mutability, mirroring the
/// shape the real ops read from the OS.
pub struct FakeWindowOps {
    windows: Mutex<HashMap<Hwnd, FakeWindow>>,
    screen: Mutex<Rect>,
}

impl FakeWindowOps {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            screen: Mutex::new(Rect::new(0, 0, 1920, 1080)),
        }
    }

    pub fn add_window(&self, hwnd: Hwnd, title: &str, visible: bool) {
        self.windows.lock().insert(
            hwnd,
            FakeWindow {
                title: title.to_string(),
                class_name: "CabinetWClass".to_string(),
                process_path: PathBuf::from("C:/Windows/explorer.exe"),
                visible,
                owner: 0,
                style: 0x1000_0000, // WS_VISIBLE
                ex_style: 0,
                parent: 0,
                bounds: Rect::new(100, 100, 800, 600),
            },
        );
    }

    pub fn destroy_window(&self, hwnd: Hwnd) {
        self.windows.lock().remove(&hwnd);
    }

    pub fn set_visible(&self, hwnd: Hwnd, visible: bool) {
        if let Some(w) = self.windows.lock().get_mut(&hwnd) {
            w.visible = visible;
        }
    }

    pub fn set_owner(&self, hwnd: Hwnd, owner: Hwnd) {
        if let Some(w) = self.windows.lock().get_mut(&hwnd) {
            w.owner = owner;
        }
    }

    pub fn set_tool_window(&self, hwnd: Hwnd, tool: bool) {
        if let Some(w) = self.windows.lock().get_mut(&hwnd) {
            if tool {
                w.ex_style |= WS_EX_TOOLWINDOW;
            } else {
                w.ex_style &= !WS_EX_TOOLWINDOW;
            }
        }
    }

    pub fn set_window_bounds(&self, hwnd: Hwnd, bounds: Rect) {
        if let Some(w) = self.windows.lock().get_mut(&hwnd) {
            w.bounds = bounds;
        }
    }

    pub fn set_screen(&self, screen: Rect) {
        *self.screen.lock() = screen;
    }
}

impl Default for FakeWindowOps {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowOps for FakeWindowOps {
    fn is_alive(&self, hwnd: Hwnd) -> bool {
        self.windows.lock().contains_key(&hwnd)
    }

    fn is_visible(&self, hwnd: Hwnd) -> bool {
        self.windows.lock().get(&hwnd).is_some_and(|w| w.visible)
    }

    fn owner(&self, hwnd: Hwnd) -> Hwnd {
        self.windows.lock().get(&hwnd).map_or(0, |w| w.owner)
    }

    fn title(&self, hwnd: Hwnd) -> Option<String> {
        self.windows.lock().get(&hwnd).map(|w| w.title.clone())
    }

    fn class_name(&self, hwnd: Hwnd) -> Option<String> {
        self.windows.lock().get(&hwnd).map(|w| w.class_name.clone())
    }

    fn process_path(&self, hwnd: Hwnd) -> Option<PathBuf> {
        self.windows
            .lock()
            .get(&hwnd)
            .map(|w| w.process_path.clone())
    }

    fn style(&self, hwnd: Hwnd) -> u32 {
        self.windows.lock().get(&hwnd).map_or(0, |w| w.style)
    }

    fn set_style(&self, hwnd: Hwnd, style: u32) {
        if let Some(w) = self.windows.lock().get_mut(&hwnd) {
            w.style = style;
        }
    }

    fn ex_style(&self, hwnd: Hwnd) -> u32 {
        self.windows.lock().get(&hwnd).map_or(0, |w| w.ex_style)
    }

    fn parent(&self, hwnd: Hwnd) -> Hwnd {
        self.windows.lock().get(&hwnd).map_or(0, |w| w.parent)
    }

    fn set_parent(&self, hwnd: Hwnd, parent: Hwnd) -> bool {
        match self.windows.lock().get_mut(&hwnd) {
            Some(w) => {
                w.parent = parent;
                true
            }
            None => false,
        }
    }

    fn bounds(&self, hwnd: Hwnd) -> Option<Rect> {
        self.windows.lock().get(&hwnd).map(|w| w.bounds)
    }

    fn set_bounds(&self, hwnd: Hwnd, rect: Rect) {
        if let Some(w) = self.windows.lock().get_mut(&hwnd) {
            w.bounds = rect;
        }
    }

    fn show(&self, hwnd: Hwnd) {
        self.set_visible(hwnd, true);
    }

    fn hide(&self, hwnd: Hwnd) {
        self.set_visible(hwnd, false);
    }

    fn activate(&self, _hwnd: Hwnd) {}

    fn virtual_screen(&self) -> Rect {
        *self.screen.lock()
    }

    fn enumerate_top_level(&self) -> Vec<Hwnd> {
        let mut hwnds: Vec<Hwnd> = self.windows.lock().keys().copied().collect();
        hwnds.sort();
        hwnds
    }
}
