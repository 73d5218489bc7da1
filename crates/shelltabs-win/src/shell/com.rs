//! COM-backed [`ShellWindows`] implementation.
//!
//! Talks to the shell object model through `IShellWindows`. Every call
//! site tolerates individual windows failing to answer: the shell keeps
//! entries for windows that are mid-teardown, and a navigation in
//! progress can make any property call fail transiently.

use std::path::PathBuf;

use tracing::debug;

use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};
use windows::Win32::System::Variant::VARIANT;
use windows::Win32::UI::Shell::{IShellWindows, ShellWindows as ShellWindowsClass};
use windows::Win32::UI::WindowsAndMessaging::GetShellWindow;
use windows::Win32::Web::InternetExplorer::IWebBrowser2;
use windows_core::Interface;

use shelltabs_core::registry::types::Hwnd;

use crate::native::win32::Win32WindowOps;
use crate::native::WindowOps;
use crate::shell::{file_url_to_path, ShellError, ShellWindowInfo, ShellWindows};

/// COM apartment guard for the calling thread.
///
/// The watcher runs on its own OS thread; initialize once on entry, drop
/// on exit.
pub struct ComApartment;

impl ComApartment {
    pub fn initialize() -> Self {
        unsafe {
            // S_FALSE (already initialized) is fine; both are balanced by
            // the CoUninitialize in Drop.
            let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
        }
        Self
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Production shell collaborator.
pub struct ComShellWindows {
    ops: Win32WindowOps,
}

impl ComShellWindows {
    pub fn new() -> Self {
        Self {
            ops: Win32WindowOps,
        }
    }

    fn open(&self) -> Result<IShellWindows, ShellError> {
        unsafe { CoCreateInstance(&ShellWindowsClass, None, CLSCTX_ALL) }.map_err(|e| {
            ShellError::Unavailable {
                message: e.message().to_string(),
            }
        })
    }

    fn window_info(&self, browser: &IWebBrowser2) -> Option<ShellWindowInfo> {
        let raw = unsafe { browser.HWND() }.ok()?;
        let hwnd = raw.0 as Hwnd;
        if hwnd == 0 {
            return None;
        }

        let title = unsafe { browser.LocationName() }
            .map(|name| name.to_string())
            .unwrap_or_default();
        let location_path: Option<PathBuf> = unsafe { browser.LocationURL() }
            .ok()
            .and_then(|url| file_url_to_path(&url.to_string()));

        let class_name = self.ops.class_name(hwnd).unwrap_or_default();
        let process_path = self.ops.process_path(hwnd).unwrap_or_default();

        Some(ShellWindowInfo {
            hwnd,
            title,
            class_name,
            process_path,
            location_path,
        })
    }
}

impl Default for ComShellWindows {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellWindows for ComShellWindows {
    fn is_ready(&self) -> Result<bool, ShellError> {
        // The shell publishes its desktop window once initialization is
        // far enough along for the object model to answer.
        let shell = unsafe { GetShellWindow() };
        Ok(!shell.0.is_null())
    }

    fn windows(&self) -> Result<Vec<ShellWindowInfo>, ShellError> {
        let shell = self.open()?;
        let count = unsafe { shell.Count() }.map_err(|e| ShellError::CallFailed {
            message: e.message().to_string(),
        })?;

        let mut windows = Vec::new();
        for index in 0..count {
            let variant = VARIANT::from(index);
            let item = match unsafe { shell.Item(&variant) } {
                Ok(item) => item,
                Err(e) => {
                    // Entries vanish while we iterate; skip and move on.
                    debug!(
                        event = "win.shell.item_unavailable",
                        index = index,
                        error = %e.message(),
                    );
                    continue;
                }
            };
            let Ok(browser) = item.cast::<IWebBrowser2>() else {
                continue;
            };
            if let Some(info) = self.window_info(&browser) {
                windows.push(info);
            }
        }

        Ok(windows)
    }
}
