//! Persisted group/window session snapshots.
//!
//! Native handles never survive a restart, so snapshots carry lightweight
//! window-identity descriptors and are re-matched against live windows on
//! startup.

pub mod errors;
pub mod persistence;
pub mod restore;
pub mod types;

pub use errors::SessionError;
pub use types::{GroupWindowState, WindowIdentity, WindowPlacement};
