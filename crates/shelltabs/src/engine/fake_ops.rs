//! Minimal [`WindowOps`] fake for engine tests.
//!
//! Tracks just enough state for the engine's paths: titles for event
//! resolution, liveness for the sweep, and activation calls for the
//! open-or-activate assertions. Reparenting side effects are covered by
//! the host's own tests in `shelltabs-win`.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use shelltabs_core::geometry::Rect;
use shelltabs_core::registry::types::Hwnd;
use shelltabs_win::native::WindowOps;

#[derive(Debug, Default)]
pub struct FakeOps {
    titles: Mutex<HashMap<Hwnd, String>>,
    activated: Mutex<Vec<Hwnd>>,
}

impl FakeOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_window(&self, hwnd: Hwnd, title: &str) {
        self.titles.lock().insert(hwnd, title.to_string());
    }

    pub fn kill(&self, hwnd: Hwnd) {
        self.titles.lock().remove(&hwnd);
    }

    pub fn last_activated(&self) -> Option<Hwnd> {
        self.activated.lock().last().copied()
    }
}

impl WindowOps for FakeOps {
    fn is_alive(&self, hwnd: Hwnd) -> bool {
        self.titles.lock().contains_key(&hwnd)
    }

    fn is_visible(&self, hwnd: Hwnd) -> bool {
        self.titles.lock().contains_key(&hwnd)
    }

    fn owner(&self, _hwnd: Hwnd) -> Hwnd {
        0
    }

    fn title(&self, hwnd: Hwnd) -> Option<String> {
        self.titles.lock().get(&hwnd).cloned()
    }

    fn class_name(&self, _hwnd: Hwnd) -> Option<String> {
        Some("CabinetWClass".to_string())
    }

    fn process_path(&self, _hwnd: Hwnd) -> Option<PathBuf> {
        Some(PathBuf::from("C:/Windows/explorer.exe"))
    }

    fn style(&self, _hwnd: Hwnd) -> u32 {
        0
    }

    fn set_style(&self, _hwnd: Hwnd, _style: u32) {}

    fn ex_style(&self, _hwnd: Hwnd) -> u32 {
        0
    }

    fn parent(&self, _hwnd: Hwnd) -> Hwnd {
        0
    }

    fn set_parent(&self, _hwnd: Hwnd, _parent: Hwnd) -> bool {
        true
    }

    fn bounds(&self, hwnd: Hwnd) -> Option<Rect> {
        self.titles
            .lock()
            .contains_key(&hwnd)
            .then_some(Rect::new(0, 0, 800, 600))
    }

    fn set_bounds(&self, _hwnd: Hwnd, _rect: Rect) {}

    fn show(&self, _hwnd: Hwnd) {}

    fn hide(&self, _hwnd: Hwnd) {}

    fn activate(&self, hwnd: Hwnd) {
        self.activated.lock().push(hwnd);
    }

    fn virtual_screen(&self) -> Rect {
        Rect::new(0, 0, 1920, 1080)
    }

    fn enumerate_top_level(&self) -> Vec<Hwnd> {
        let mut hwnds: Vec<Hwnd> = self.titles.lock().keys().copied().collect();
        hwnds.sort();
        hwnds
    }
}
