//! Configuration management.
//!
//! The settings context is loaded once at startup and passed explicitly
//! into every component that needs it at construction time; there is no
//! ambient global settings state.

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use loading::{config_file_path, load_or_default};
pub use types::{BehaviorConfig, HostConfig, IpcConfig, ResilienceConfig, ShellTabsConfig};
