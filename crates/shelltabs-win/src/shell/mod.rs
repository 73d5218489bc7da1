//! Shell-window-enumeration collaborator.
//!
//! The shell object model is the authoritative source for file-manager
//! windows: it knows the folder a window is showing, not just its title.
//! It is also the flakiest dependency in the system; calls fail while the
//! shell is starting, busy or mid-navigation. Everything going through
//! [`ShellWindows`] is wrapped in bounded retry by the watcher.

#[cfg(windows)]
pub mod com;

use std::path::PathBuf;

use shelltabs_core::registry::types::Hwnd;

/// One window as reported by the shell object model.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellWindowInfo {
    pub hwnd: Hwnd,
    /// Folder display name (the shell's location name).
    pub title: String,
    pub class_name: String,
    pub process_path: PathBuf,
    /// Filesystem path of the folder being shown, when resolvable.
    pub location_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Shell object model is not available: {message}")]
    Unavailable { message: String },

    #[error("Shell call failed: {message}")]
    CallFailed { message: String },
}

impl shelltabs_core::errors::ShellTabsError for ShellError {
    fn error_code(&self) -> &'static str {
        match self {
            ShellError::Unavailable { .. } => "SHELL_UNAVAILABLE",
            ShellError::CallFailed { .. } => "SHELL_CALL_FAILED",
        }
    }
}

/// Contract the shell watcher polls.
///
/// The production implementation talks COM; tests substitute a fake.
pub trait ShellWindows: Send + Sync {
    /// Whether the shell process has finished initializing.
    fn is_ready(&self) -> Result<bool, ShellError>;

    /// Enumerate the shell's current file-manager windows.
    fn windows(&self) -> Result<Vec<ShellWindowInfo>, ShellError>;
}

/// Convert a shell `file:///` location URL to a filesystem path.
///
/// The shell reports locations as URLs with percent-encoded characters;
/// non-file URLs (control-panel namespaces etc.) have no filesystem path.
pub fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file:///")?;
    let decoded = percent_decode(rest);
    Some(PathBuf::from(decoded.replace('/', "\\")))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 3 <= bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
