//! shelltabs-win: Windows layer for shelltabs
//!
//! Everything that touches a native window handle lives here: the two
//! window event sources (WinEvent hooks and the shell object model), the
//! reparenting host that moves foreign windows under a container, and the
//! thin safe wrappers over the Win32 calls they share.
//!
//! The Win32-backed implementations are gated on `cfg(windows)`; the
//! traits, state machines and watcher logic are platform-neutral and
//! unit-tested against fakes everywhere else.

pub mod host;
pub mod native;
pub mod shell;
pub mod sources;

#[cfg(test)]
pub(crate) mod testing;

pub use host::{HostTab, ReparentRecord, TabHost, TabState};
pub use native::WindowOps;
pub use shell::{ShellError, ShellWindowInfo, ShellWindows};
pub use sources::{RawWindowEvent, ShellNotification};
