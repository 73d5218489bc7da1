//! Folder-opening collaborator.
//!
//! The engine never spawns file-manager windows itself; it asks the shell
//! to, then adopts the window that appears via the pending-open list.

/// Ask the platform shell to open a folder window.
pub trait FolderOpener: Send + Sync {
    /// Returns whether the shell accepted the request. The window itself
    /// arrives later as a create notification, if at all.
    fn open_folder(&self, path: &str) -> bool;
}

/// Production opener backed by the shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellFolderOpener;

#[cfg(windows)]
impl FolderOpener for ShellFolderOpener {
    fn open_folder(&self, path: &str) -> bool {
        use windows::Win32::Foundation::HWND;
        use windows::Win32::UI::Shell::ShellExecuteW;
        use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
        use windows_core::{w, PCWSTR};

        let wide: Vec<u16> = path.encode_utf16().chain(std::iter::once(0)).collect();
        let result = unsafe {
            ShellExecuteW(
                HWND::default(),
                w!("open"),
                PCWSTR(wide.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
                SW_SHOWNORMAL,
            )
        };
        // Per the shell contract, values above 32 indicate success.
        (result.0 as usize) > 32
    }
}

#[cfg(not(windows))]
impl FolderOpener for ShellFolderOpener {
    fn open_folder(&self, path: &str) -> bool {
        tracing::warn!(
            event = "app.opener.unsupported_platform",
            path = %path,
        );
        false
    }
}
