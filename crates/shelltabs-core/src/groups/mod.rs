//! Group membership and lifecycle.
//!
//! A group is a user-visible bundle of windows sharing one host
//! container. The manager owns the handle↔group mapping and keeps it
//! mutually consistent with the per-group member lists.

pub mod manager;
pub mod types;

pub use manager::GroupManager;
pub use types::{Group, GroupId};
