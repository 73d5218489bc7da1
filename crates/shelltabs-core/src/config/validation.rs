use crate::config::types::ShellTabsConfig;
use crate::errors::ConfigError;

/// Reject configurations the engine cannot run with.
///
/// Only hard errors fail validation; questionable-but-workable values
/// (e.g. a regex rule that will never compile) are the rule engine's
/// problem and degrade to "never matches" at evaluation time.
pub fn validate_config(config: &ShellTabsConfig) -> Result<(), ConfigError> {
    if config.ipc.pipe_name.trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "ipc.pipe_name must not be empty".to_string(),
        });
    }

    if config.resilience.backoff_min_ms() > config.resilience.backoff_max_ms() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "resilience.backoff_min_ms ({}) must not exceed backoff_max_ms ({})",
                config.resilience.backoff_min_ms(),
                config.resilience.backoff_max_ms()
            ),
        });
    }

    if config.host.sweep_interval_secs() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "host.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.value.is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("rules[{}].value must not be empty", index),
            });
        }
        if rule.target.is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("rules[{}].target must not be empty", index),
            });
        }
    }

    Ok(())
}
