//! Built-in fallback values for every tunable the engine consumes.

pub fn default_debounce_ms() -> u64 {
    150
}

pub fn default_retry_attempts() -> u32 {
    3
}

pub fn default_retry_delay_ms() -> u64 {
    100
}

pub fn default_backoff_min_ms() -> u64 {
    100
}

pub fn default_backoff_max_ms() -> u64 {
    2000
}

pub fn default_failure_threshold() -> usize {
    5
}

pub fn default_failure_window_ms() -> u64 {
    30_000
}

pub fn default_cooldown_ms() -> u64 {
    10_000
}

pub fn default_sweep_interval_secs() -> u64 {
    3
}

pub fn default_shell_poll_ms() -> u64 {
    1_000
}

pub fn default_pipe_name() -> String {
    r"\\.\pipe\shelltabs-open".to_string()
}
