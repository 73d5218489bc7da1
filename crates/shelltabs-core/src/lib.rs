//! shelltabs-core: Core engine for grouping top-level windows into tabs
//!
//! This library holds the platform-independent half of shelltabs: the
//! canonical window registry, the auto-grouping rule engine, the group
//! manager, resilience primitives for flaky native calls, and the
//! persisted session/config shapes. Everything that talks to Win32 lives
//! in `shelltabs-win`; everything on the wire lives in `shelltabs-ipc`.
//!
//! # Main Entry Points
//!
//! - [`registry`] - Reconcile window events from both sources into one map
//! - [`groups`] - Group membership and lifecycle
//! - [`rules`] - Auto-grouping rule evaluation
//! - [`resilience`] - Retry, backoff and failure-window primitives
//! - [`config`] - Settings context loaded from disk
//! - [`session`] - Persisted group/window snapshots

pub mod config;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod groups;
pub mod logging;
pub mod registry;
pub mod resilience;
pub mod rules;
pub mod session;

// Re-export commonly used types at crate root for convenience
pub use config::ShellTabsConfig;
pub use events::{CoreEvent, EventBus};
pub use geometry::Rect;
pub use groups::{Group, GroupId, GroupManager};
pub use registry::types::{Hwnd, LifecycleState, SourceKind, WindowDescriptor, WindowEntry};
pub use registry::WindowRegistry;
pub use resilience::{retry, BackoffDelay, FailureWindow};
pub use rules::{AutoGroupRule, MatchKind};
pub use session::types::{GroupWindowState, WindowIdentity, WindowPlacement};

// Re-export logging initialization
pub use logging::init_logging;
