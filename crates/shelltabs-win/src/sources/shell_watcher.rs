//! Shell-specific window event source.
//!
//! Polls the shell-window-enumeration collaborator on a dedicated
//! background thread: hook callbacks must never wait on the shell, and
//! shell object-model calls can take arbitrarily long when the shell
//! process is struggling. Every call goes through the bounded-retry
//! primitive; a failure rate past the configured threshold trips a
//! cooldown so a broken shell is not hammered.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shelltabs_core::registry::types::{Hwnd, SourceWindow};
use shelltabs_core::resilience::{retry, BackoffDelay, FailureWindow};

use crate::shell::{ShellWindowInfo, ShellWindows};

/// Slice length for cancellable sleeps; bounds shutdown latency.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Notifications the watcher emits toward the reconciliation worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellNotification {
    /// The shell finished initializing and answered its first probe.
    Ready,
    Created(SourceWindow),
    Destroyed(Hwnd),
}

#[derive(Debug, Clone)]
pub struct ShellWatcherConfig {
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
    pub failure_threshold: usize,
    pub failure_window: Duration,
    pub cooldown: Duration,
    pub poll_interval: Duration,
}

impl Default for ShellWatcherConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay: Duration::from_millis(100),
            backoff_min: Duration::from_millis(100),
            backoff_max: Duration::from_millis(2000),
            failure_threshold: 5,
            failure_window: Duration::from_secs(30),
            cooldown: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }
}

pub struct ShellWatcher<S: ShellWindows + 'static> {
    shell: Arc<S>,
    config: ShellWatcherConfig,
    tx: UnboundedSender<ShellNotification>,
    cancel: CancellationToken,
}

impl<S: ShellWindows + 'static> ShellWatcher<S> {
    pub fn new(
        shell: Arc<S>,
        config: ShellWatcherConfig,
        tx: UnboundedSender<ShellNotification>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            shell,
            config,
            tx,
            cancel,
        }
    }

    /// Run the watcher on its own OS thread until cancellation.
    pub fn spawn(self) -> std::thread::JoinHandle<()> {
        std::thread::Builder::new()
            .name("shelltabs-shell-watcher".to_string())
            .spawn(move || self.run())
            .expect("failed to spawn shell watcher thread")
    }

    /// Watcher body: wait for the shell to become ready, then poll.
    pub fn run(self) {
        if !self.wait_until_ready() {
            return;
        }
        let _ = self.tx.send(ShellNotification::Ready);
        info!(event = "win.shell_watcher.shell_ready");
        self.poll_loop();
        debug!(event = "win.shell_watcher.stopped");
    }

    fn wait_until_ready(&self) -> bool {
        let mut backoff = BackoffDelay::new(self.config.backoff_min, self.config.backoff_max);
        while !self.cancel.is_cancelled() {
            let ready = retry(
                || self.shell.is_ready(),
                self.config.retry_attempts,
                self.config.retry_delay,
                |attempt, e| {
                    warn!(
                        event = "win.shell_watcher.ready_probe_failed",
                        attempt = attempt,
                        error = %e,
                    );
                },
            );
            if ready == Some(true) {
                return true;
            }
            self.sleep_cancellable(backoff.next_delay());
        }
        false
    }

    fn poll_loop(&self) {
        let mut known: HashMap<Hwnd, SourceWindow> = HashMap::new();
        let mut failures = FailureWindow::new();

        while !self.cancel.is_cancelled() {
            let result = retry(
                || self.shell.windows(),
                self.config.retry_attempts,
                self.config.retry_delay,
                |attempt, e| {
                    warn!(
                        event = "win.shell_watcher.enumeration_failed",
                        attempt = attempt,
                        error = %e,
                    );
                },
            );

            match result {
                Some(windows) => {
                    self.reconcile(&mut known, windows);
                }
                None => {
                    failures.record();
                    let recent = failures.count_recent(self.config.failure_window);
                    if recent >= self.config.failure_threshold {
                        warn!(
                            event = "win.shell_watcher.cooldown_entered",
                            recent_failures = recent,
                            cooldown_ms = self.config.cooldown.as_millis() as u64,
                        );
                        self.sleep_cancellable(self.config.cooldown);
                        failures.clear();
                    }
                }
            }

            self.sleep_cancellable(self.config.poll_interval);
        }
    }

    fn reconcile(&self, known: &mut HashMap<Hwnd, SourceWindow>, current: Vec<ShellWindowInfo>) {
        let mut seen: HashMap<Hwnd, SourceWindow> = HashMap::new();
        for info in current {
            let window = SourceWindow {
                hwnd: info.hwnd,
                title: info.title,
                class_name: info.class_name,
                process_path: info.process_path,
            };
            seen.insert(window.hwnd, window);
        }

        for (hwnd, window) in &seen {
            // New window, or metadata changed (navigation renames the
            // location); either way the registry wants the fresh data.
            if known.get(hwnd) != Some(window) {
                let _ = self.tx.send(ShellNotification::Created(window.clone()));
            }
        }
        for hwnd in known.keys() {
            if !seen.contains_key(hwnd) {
                let _ = self.tx.send(ShellNotification::Destroyed(*hwnd));
            }
        }

        *known = seen;
    }

    fn sleep_cancellable(&self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() && !self.cancel.is_cancelled() {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
