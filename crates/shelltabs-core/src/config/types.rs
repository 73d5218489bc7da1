//! Configuration type definitions for shelltabs.
//!
//! These types are serialized/deserialized from the TOML config file at
//! `~/.shelltabs/config.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [behavior]
//! auto_group_enabled = true
//! auto_close_empty_groups = true
//! debounce_ms = 150
//!
//! [resilience]
//! retry_attempts = 3
//! failure_threshold = 5
//!
//! [[rules]]
//! kind = "process_name"
//! value = "explorer.exe"
//! target = "explorer"
//! priority = 10
//! ```

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::rules::AutoGroupRule;

/// Main configuration loaded from the TOML config file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShellTabsConfig {
    /// Behavior flags and debounce timing
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Retry/backoff/circuit-breaker tuning for flaky native calls
    #[serde(default)]
    pub resilience: ResilienceConfig,

    /// Host/reparenting subsystem tuning
    #[serde(default)]
    pub host: HostConfig,

    /// Open-folder interception channel
    #[serde(default)]
    pub ipc: IpcConfig,

    /// Auto-grouping rules, evaluated in descending priority order
    #[serde(default)]
    pub rules: Vec<AutoGroupRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Whether new windows are run through the auto-grouping rules.
    #[serde(default = "default_true")]
    pub auto_group_enabled: bool,

    /// Whether a group is closed as soon as its last member leaves.
    #[serde(default = "default_true")]
    pub auto_close_empty_groups: bool,

    /// Window (ms) within which repeated show/hide requests for the same
    /// handle are suppressed. Default: 150ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl BehaviorConfig {
    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms.unwrap_or_else(defaults::default_debounce_ms)
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            auto_group_enabled: true,
            auto_close_empty_groups: true,
            debounce_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResilienceConfig {
    /// Retries per native call (attempts = retries + 1). Default: 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,

    /// Fixed delay (ms) between retry attempts. Default: 100ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,

    /// Backoff floor (ms). Default: 100ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_min_ms: Option<u64>,

    /// Backoff ceiling (ms). Default: 2000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_max_ms: Option<u64>,

    /// Shell failures within the window that trip the breaker. Default: 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<usize>,

    /// Width (ms) of the sliding failure window. Default: 30000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_window_ms: Option<u64>,

    /// Cooldown (ms) before shell calls resume after the breaker trips.
    /// Default: 10000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_ms: Option<u64>,
}

impl ResilienceConfig {
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
            .unwrap_or_else(defaults::default_retry_attempts)
    }

    pub fn retry_delay_ms(&self) -> u64 {
        self.retry_delay_ms
            .unwrap_or_else(defaults::default_retry_delay_ms)
    }

    pub fn backoff_min_ms(&self) -> u64 {
        self.backoff_min_ms
            .unwrap_or_else(defaults::default_backoff_min_ms)
    }

    pub fn backoff_max_ms(&self) -> u64 {
        self.backoff_max_ms
            .unwrap_or_else(defaults::default_backoff_max_ms)
    }

    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
            .unwrap_or_else(defaults::default_failure_threshold)
    }

    pub fn failure_window_ms(&self) -> u64 {
        self.failure_window_ms
            .unwrap_or_else(defaults::default_failure_window_ms)
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms.unwrap_or_else(defaults::default_cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// Interval (s) between liveness sweeps over attached tabs. Default: 3s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,

    /// Interval (ms) between shell window enumeration polls. Default: 1000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_poll_ms: Option<u64>,
}

impl HostConfig {
    pub fn sweep_interval_secs(&self) -> u64 {
        self.sweep_interval_secs
            .unwrap_or_else(defaults::default_sweep_interval_secs)
    }

    pub fn shell_poll_ms(&self) -> u64 {
        self.shell_poll_ms
            .unwrap_or_else(defaults::default_shell_poll_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    /// Well-known local channel name the interception server listens on.
    #[serde(default = "defaults::default_pipe_name")]
    pub pipe_name: String,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            pipe_name: defaults::default_pipe_name(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_roundtrip() {
        let config = ShellTabsConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ShellTabsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            config.behavior.debounce_ms(),
            parsed.behavior.debounce_ms()
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ShellTabsConfig = toml::from_str("").unwrap();
        assert!(config.behavior.auto_group_enabled);
        assert!(config.behavior.auto_close_empty_groups);
        assert_eq!(config.behavior.debounce_ms(), 150);
        assert_eq!(config.resilience.retry_attempts(), 3);
        assert_eq!(config.resilience.backoff_min_ms(), 100);
        assert_eq!(config.resilience.backoff_max_ms(), 2000);
        assert_eq!(config.resilience.failure_threshold(), 5);
        assert_eq!(config.host.sweep_interval_secs(), 3);
        assert_eq!(config.ipc.pipe_name, r"\\.\pipe\shelltabs-open");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config: ShellTabsConfig = toml::from_str(
            r#"
[behavior]
auto_group_enabled = false
debounce_ms = 250
"#,
        )
        .unwrap();
        assert!(!config.behavior.auto_group_enabled);
        assert_eq!(config.behavior.debounce_ms(), 250);
        assert_eq!(config.resilience.retry_attempts(), 3);
    }

    #[test]
    fn test_rules_from_toml() {
        let config: ShellTabsConfig = toml::from_str(
            r#"
[[rules]]
kind = "process_name"
value = "explorer.exe"
target = "explorer"
priority = 10

[[rules]]
kind = "title_regex"
value = "^Downloads"
target = "downloads"
"#,
        )
        .unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].target, "explorer");
        assert!(config.rules[1].enabled);
    }
}
