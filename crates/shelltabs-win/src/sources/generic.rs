//! Generic window event source.
//!
//! Installs global WinEvent hooks for foreground, create and destroy
//! notifications, after seeding the registry with a one-time enumeration
//! of the windows that already exist. Hook callbacks arrive on the
//! dedicated pump thread and only filter and forward; all metadata
//! resolution happens downstream on a worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::native::WindowOps;
use crate::sources::{is_candidate, RawWindowEvent};

#[cfg(windows)]
use once_cell::sync::Lazy;

/// Sender the hook callback forwards into. A process has at most one
/// generic source installed; starting a second is a no-op.
#[cfg(windows)]
static HOOK_SENDER: Lazy<Mutex<Option<UnboundedSender<RawWindowEvent>>>> =
    Lazy::new(|| Mutex::new(None));

pub struct GenericSource {
    ops: Arc<dyn WindowOps>,
    tx: UnboundedSender<RawWindowEvent>,
    started: AtomicBool,
    pump: Mutex<Option<PumpHandle>>,
}

struct PumpHandle {
    thread: std::thread::JoinHandle<()>,
    #[cfg(windows)]
    thread_id: u32,
}

impl GenericSource {
    pub fn new(ops: Arc<dyn WindowOps>, tx: UnboundedSender<RawWindowEvent>) -> Self {
        Self {
            ops,
            tx,
            started: AtomicBool::new(false),
            pump: Mutex::new(None),
        }
    }

    /// Install hooks and seed existing windows. Idempotent: a second
    /// start while running is a no-op.
    pub fn start(&self) {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(event = "win.generic_source.already_started");
            return;
        }

        seed_existing(self.ops.as_ref(), &self.tx);
        self.install_pump();
        info!(event = "win.generic_source.started");
    }

    /// Remove hooks and stop the pump thread. Idempotent: stopping a
    /// source that is not running is a no-op.
    pub fn stop(&self) {
        if self
            .started
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(event = "win.generic_source.not_started");
            return;
        }

        self.teardown_pump();
        info!(event = "win.generic_source.stopped");
    }

    #[cfg(windows)]
    fn install_pump(&self) {
        *HOOK_SENDER.lock() = Some(self.tx.clone());

        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let thread = std::thread::Builder::new()
            .name("shelltabs-winevent".to_string())
            .spawn(move || {
                let thread_id =
                    unsafe { windows::Win32::System::Threading::GetCurrentThreadId() };
                let _ = ready_tx.send(thread_id);
                pump::run();
            })
            .expect("failed to spawn winevent pump thread");

        let thread_id = ready_rx
            .recv()
            .expect("winevent pump thread died before reporting its id");
        *self.pump.lock() = Some(PumpHandle { thread, thread_id });
    }

    #[cfg(not(windows))]
    fn install_pump(&self) {
        // Event hooks exist only on Windows; elsewhere the source still
        // seeds from enumeration so the engine logic stays exercisable.
        let _ = &self.pump;
    }

    #[cfg(windows)]
    fn teardown_pump(&self) {
        let handle = self.pump.lock().take();
        if let Some(handle) = handle {
            use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
            unsafe {
                if let Err(e) = PostThreadMessageW(
                    handle.thread_id,
                    WM_QUIT,
                    Default::default(),
                    Default::default(),
                ) {
                    tracing::warn!(
                        event = "win.generic_source.quit_post_failed",
                        error = %e,
                    );
                }
            }
            if handle.thread.join().is_err() {
                tracing::warn!(event = "win.generic_source.pump_join_failed");
            }
        }
        *HOOK_SENDER.lock() = None;
    }

    #[cfg(not(windows))]
    fn teardown_pump(&self) {
        self.pump.lock().take();
    }
}

/// One-time enumeration of existing top-level windows to seed state.
pub fn seed_existing(ops: &dyn WindowOps, tx: &UnboundedSender<RawWindowEvent>) {
    let mut seeded = 0usize;
    for hwnd in ops.enumerate_top_level() {
        if is_candidate(ops, hwnd) {
            if tx.send(RawWindowEvent::Created(hwnd)).is_err() {
                return;
            }
            seeded += 1;
        }
    }
    debug!(event = "win.generic_source.seeded", count = seeded);
}

#[cfg(windows)]
mod pump {
    use super::HOOK_SENDER;
    use crate::native::win32::Win32WindowOps;
    use crate::sources::{is_candidate, RawWindowEvent};
    use shelltabs_core::registry::types::Hwnd;

    use windows::Win32::Foundation::{HMODULE, HWND};
    use windows::Win32::UI::Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK};
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, CHILDID_SELF, EVENT_OBJECT_CREATE,
        EVENT_OBJECT_DESTROY, EVENT_SYSTEM_FOREGROUND, MSG, OBJID_WINDOW,
        WINEVENT_OUTOFCONTEXT, WINEVENT_SKIPOWNPROCESS,
    };

    unsafe extern "system" fn win_event_proc(
        _hook: HWINEVENTHOOK,
        event: u32,
        hwnd: HWND,
        id_object: i32,
        id_child: i32,
        _id_thread: u32,
        _time: u32,
    ) {
        if id_object != OBJID_WINDOW.0 || id_child != CHILDID_SELF as i32 {
            return;
        }
        let raw = hwnd.0 as Hwnd;
        if raw == 0 {
            return;
        }

        let forwarded = match event {
            EVENT_OBJECT_CREATE => {
                // Cheap same-desktop reads only; metadata resolution that
                // crosses process boundaries happens on the worker.
                if is_candidate(&Win32WindowOps, raw) {
                    Some(RawWindowEvent::Created(raw))
                } else {
                    None
                }
            }
            EVENT_OBJECT_DESTROY => Some(RawWindowEvent::Destroyed(raw)),
            EVENT_SYSTEM_FOREGROUND => Some(RawWindowEvent::Foreground(raw)),
            _ => None,
        };

        if let Some(event) = forwarded {
            let sender = HOOK_SENDER.lock();
            if let Some(tx) = sender.as_ref() {
                let _ = tx.send(event);
            }
        }
    }

    fn install_hooks() -> Vec<HWINEVENTHOOK> {
        let flags = WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS;
        let ranges = [
            (EVENT_SYSTEM_FOREGROUND, EVENT_SYSTEM_FOREGROUND),
            (EVENT_OBJECT_CREATE, EVENT_OBJECT_DESTROY),
        ];
        ranges
            .iter()
            .filter_map(|&(min, max)| {
                let hook = unsafe {
                    SetWinEventHook(
                        min,
                        max,
                        HMODULE::default(),
                        Some(win_event_proc),
                        0,
                        0,
                        flags,
                    )
                };
                if hook.is_invalid() { None } else { Some(hook) }
            })
            .collect()
    }

    /// Hook installation and message pump for the dedicated thread.
    ///
    /// Runs until a WM_QUIT arrives, then releases every hook handle
    /// before returning so a later start reinstalls cleanly.
    pub fn run() {
        let hooks = install_hooks();
        let mut msg = MSG::default();
        loop {
            let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if result.0 <= 0 {
                break;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        for hook in hooks {
            unsafe {
                let _ = UnhookWinEvent(hook);
            }
        }
    }
}
