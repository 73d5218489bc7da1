//! Engine wiring.
//!
//! Connects the pieces the crates expose: raw events from both sources
//! flow into the registry, registry events drive auto-grouping, group
//! membership drives the reparenting hosts, and intercepted open-folder
//! requests land in the same open-or-activate path the UI would use.

pub mod opener;
pub mod pending;

#[cfg(test)]
mod fake_ops;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shelltabs_core::config::ShellTabsConfig;
use shelltabs_core::events::{CoreEvent, EventBus};
use shelltabs_core::geometry::Rect;
use shelltabs_core::groups::{GroupId, GroupManager};
use shelltabs_core::registry::types::{Hwnd, LifecycleState, SourceKind, WindowDescriptor};
use shelltabs_core::registry::WindowRegistry;
use shelltabs_core::rules;
use shelltabs_core::session::persistence::{
    ensure_state_directory, load_group_states, save_group_state,
};
use shelltabs_core::session::restore::match_windows;
use shelltabs_core::session::types::{GroupWindowState, WindowIdentity, WindowPlacement};
use shelltabs_ipc::OpenRequest;
use shelltabs_win::host::{HostContainer, TabHost};
use shelltabs_win::native::WindowOps;
use shelltabs_win::sources::{resolve_window, RawWindowEvent, ShellNotification};

use self::opener::FolderOpener;
use self::pending::{folder_display_name, PendingOpens};

/// How long an intercepted open waits for its window before expiring.
const PENDING_OPEN_TTL: Duration = Duration::from_secs(10);

pub struct Engine {
    config: ShellTabsConfig,
    state_dir: PathBuf,
    events: EventBus,
    registry: Arc<WindowRegistry>,
    groups: Arc<GroupManager>,
    hosts: Mutex<HashMap<GroupId, Arc<TabHost>>>,
    ops: Arc<dyn WindowOps>,
    opener: Arc<dyn FolderOpener>,
    pending: PendingOpens,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        config: ShellTabsConfig,
        state_dir: PathBuf,
        ops: Arc<dyn WindowOps>,
        opener: Arc<dyn FolderOpener>,
    ) -> Arc<Self> {
        let events = EventBus::new();
        let debounce = Duration::from_millis(config.behavior.debounce_ms());
        let registry = Arc::new(WindowRegistry::new(events.clone(), debounce));
        let groups = Arc::new(GroupManager::new(
            events.clone(),
            config.behavior.auto_close_empty_groups,
        ));

        Arc::new(Self {
            config,
            state_dir,
            events,
            registry,
            groups,
            hosts: Mutex::new(HashMap::new()),
            ops,
            opener,
            pending: PendingOpens::new(PENDING_OPEN_TTL),
            cancel: CancellationToken::new(),
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn groups(&self) -> &GroupManager {
        &self.groups
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The presentation layer registers a container window for a group;
    /// membership changes from then on reparent into it.
    pub fn register_host(&self, group_id: GroupId, container: Arc<dyn HostContainer>) -> Arc<TabHost> {
        let host = Arc::new(TabHost::new(
            self.ops.clone(),
            container,
            group_id,
            self.events.clone(),
            self.registry.visibility_gate(),
        ));

        if let Some(group) = self.groups.get(group_id) {
            if let Some(saved) = group.saved_bounds {
                host.apply_saved_bounds(saved);
            }
            for hwnd in group.members {
                host.attach(hwnd);
            }
            if let Some(&first) = self.groups.members(group_id).first() {
                host.select(first);
            }
        }

        self.hosts.lock().insert(group_id, host.clone());
        host
    }

    pub fn host_of(&self, group_id: GroupId) -> Option<Arc<TabHost>> {
        self.hosts.lock().get(&group_id).cloned()
    }

    /// Main event pump. Runs until cancellation.
    pub async fn run(
        &self,
        mut raw_rx: UnboundedReceiver<RawWindowEvent>,
        mut shell_rx: UnboundedReceiver<ShellNotification>,
    ) {
        let mut core_rx = self.events.subscribe();
        let mut sweep = tokio::time::interval(Duration::from_secs(
            self.config.host.sweep_interval_secs(),
        ));
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(event = "app.engine.started");
        loop {
            tokio::select! {
                Some(raw) = raw_rx.recv() => self.handle_raw_event(raw),
                Some(notification) = shell_rx.recv() => self.handle_shell_notification(notification),
                result = core_rx.recv() => {
                    match result {
                        Ok(event) => self.handle_core_event(event),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(event = "app.engine.events_lagged", skipped = skipped);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = sweep.tick() => self.run_sweeps(),
                _ = self.cancel.cancelled() => break,
            }
        }
        info!(event = "app.engine.stopped");
    }

    /// Shutdown: release every hosted window and persist the session.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let hosts: Vec<Arc<TabHost>> = self.hosts.lock().values().cloned().collect();
        for host in hosts {
            host.detach_all();
        }
        self.save_snapshots();
        info!(event = "app.engine.shutdown_completed");
    }

    fn handle_raw_event(&self, raw: RawWindowEvent) {
        match raw {
            RawWindowEvent::Created(hwnd) => {
                if let Some(window) = resolve_window(self.ops.as_ref(), hwnd) {
                    self.registry.on_created(SourceKind::Generic, window);
                }
            }
            RawWindowEvent::Destroyed(hwnd) => {
                self.registry.on_destroyed(SourceKind::Generic, hwnd);
            }
            RawWindowEvent::Foreground(hwnd) => {
                self.registry.on_foreground(SourceKind::Generic, hwnd);
            }
        }
    }

    fn handle_shell_notification(&self, notification: ShellNotification) {
        match notification {
            ShellNotification::Ready => {
                info!(event = "app.engine.shell_source_ready");
            }
            ShellNotification::Created(window) => {
                self.registry.on_created(SourceKind::Shell, window);
            }
            ShellNotification::Destroyed(hwnd) => {
                self.registry.on_destroyed(SourceKind::Shell, hwnd);
            }
        }
    }

    fn handle_core_event(&self, event: CoreEvent) {
        match event {
            CoreEvent::WindowCreated { hwnd, title } => {
                self.place_new_window(hwnd, &title);
            }
            CoreEvent::WindowDestroyed { hwnd } => {
                if self.groups.remove(hwnd) {
                    self.save_snapshots();
                }
            }
            CoreEvent::TabAdded { group_id, hwnd } => {
                if let Some(host) = self.host_of(group_id) {
                    host.attach(hwnd);
                    host.select(hwnd);
                }
                self.save_snapshots();
            }
            CoreEvent::TabRemoved { group_id, hwnd } => {
                if let Some(host) = self.host_of(group_id) {
                    host.detach(hwnd);
                }
                self.save_snapshots();
            }
            CoreEvent::GroupDisbanded { group_id } => {
                if let Some(host) = self.hosts.lock().remove(&group_id) {
                    host.detach_all();
                }
            }
            CoreEvent::TabSwitched { group_id, hwnd } => {
                if let Some(group) = self.groups.get(group_id) {
                    // Mirror host visibility into registry lifecycle state.
                    for &member in &group.members {
                        let state = if member == hwnd {
                            LifecycleState::Visible
                        } else {
                            LifecycleState::Hidden
                        };
                        self.registry.set_state(member, state);
                    }
                    if let Some(index) = group.members.iter().position(|&h| h == hwnd) {
                        self.groups.record_active_index(group_id, index);
                    }
                }
            }
            CoreEvent::WindowActivated { .. } | CoreEvent::GroupCreated { .. } => {}
        }
    }

    /// Decide where a freshly registered window belongs.
    ///
    /// A pending intercepted open wins over auto-grouping; auto-grouping
    /// never moves a window that already has a group.
    fn place_new_window(&self, hwnd: Hwnd, title: &str) {
        if let Some(target) = self.pending.claim(title) {
            let group_id = target.unwrap_or_else(|| {
                self.groups.create(folder_display_name(title).to_string())
            });
            self.groups.add(group_id, hwnd);
            debug!(
                event = "app.engine.pending_open_adopted",
                hwnd = hwnd,
                group_id = %group_id,
            );
            return;
        }

        if !self.config.behavior.auto_group_enabled {
            return;
        }
        if self.groups.group_of(hwnd).is_some() {
            return;
        }
        let Some(descriptor) = self.registry.descriptor(hwnd) else {
            return;
        };
        if let Some(target_name) = rules::evaluate(&self.config.rules, &descriptor) {
            let group_id = self
                .groups
                .find_by_name(&target_name)
                .unwrap_or_else(|| self.groups.create(target_name));
            self.groups.add(group_id, hwnd);
        }
    }

    /// Open-or-activate entry point shared by the IPC server and the UI.
    ///
    /// If a tracked window already shows the requested folder it is
    /// activated (and its tab selected); otherwise the shell is asked to
    /// open the folder and the eventual window is routed to the
    /// requester's group.
    pub fn open_or_activate(&self, request: &OpenRequest) {
        let folder = folder_display_name(&request.path);

        for entry in self.registry.windows_by_recency() {
            if entry.title.eq_ignore_ascii_case(folder)
                || entry.title.eq_ignore_ascii_case(&request.path)
            {
                debug!(
                    event = "app.engine.open_activated_existing",
                    hwnd = entry.hwnd,
                    path = %request.path,
                );
                if let Some(group_id) = self.groups.group_of(entry.hwnd) {
                    if let Some(host) = self.host_of(group_id) {
                        host.select(entry.hwnd);
                    }
                }
                self.ops.activate(entry.hwnd);
                return;
            }
        }

        let target = self.groups.group_of(request.origin);
        self.pending.push(&request.path, target);
        if !self.opener.open_folder(&request.path) {
            warn!(
                event = "app.engine.open_folder_failed",
                path = %request.path,
            );
        }
    }

    fn run_sweeps(&self) {
        let hosts: Vec<Arc<TabHost>> = self.hosts.lock().values().cloned().collect();
        for host in hosts {
            for hwnd in host.sweep() {
                self.groups.remove(hwnd);
                self.registry.on_destroyed(SourceKind::Generic, hwnd);
            }
        }
    }

    /// Rebuild groups from persisted snapshots by re-matching live
    /// windows. Call once the sources have had a chance to seed the
    /// registry.
    pub fn restore_session(&self) {
        let (states, skipped) = match load_group_states(&self.state_dir) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(
                    event = "app.engine.session_restore_failed",
                    error = %e,
                );
                return;
            }
        };
        if skipped > 0 {
            warn!(event = "app.engine.session_files_skipped", count = skipped);
        }

        let live: Vec<(Hwnd, WindowDescriptor)> = self
            .registry
            .windows_by_recency()
            .into_iter()
            .map(|entry| (entry.hwnd, entry.descriptor()))
            .collect();

        for state in states {
            let matched = match_windows(&state, &live);
            if matched.is_empty() {
                continue;
            }
            let group_id = self
                .groups
                .find_by_name(&state.group_name)
                .unwrap_or_else(|| self.groups.create(state.group_name.clone()));
            self.groups
                .record_bounds(group_id, self.clamped_restore_bounds(state.bounds));
            for hwnd in &matched {
                self.groups.add(group_id, *hwnd);
            }
            info!(
                event = "app.engine.session_group_restored",
                group = %state.group_name,
                matched = matched.len(),
            );
        }
    }

    fn clamped_restore_bounds(&self, saved: Rect) -> Rect {
        shelltabs_core::geometry::clamp_to_virtual_screen(saved, self.ops.virtual_screen())
    }

    /// Persist a snapshot per non-empty group.
    pub fn save_snapshots(&self) {
        if let Err(e) = ensure_state_directory(&self.state_dir) {
            warn!(event = "app.engine.state_dir_unavailable", error = %e);
            return;
        }

        for group in self.groups.snapshot() {
            if group.members.is_empty() {
                continue;
            }
            let windows: Vec<WindowIdentity> = group
                .members
                .iter()
                .filter_map(|&hwnd| self.registry.descriptor(hwnd))
                .map(|descriptor| WindowIdentity::from_descriptor(&descriptor))
                .collect();
            if windows.is_empty() {
                continue;
            }

            let state = GroupWindowState {
                group_name: group.name.clone(),
                bounds: group
                    .saved_bounds
                    .unwrap_or_else(|| self.ops.virtual_screen()),
                placement: group.saved_placement.unwrap_or(WindowPlacement::Normal),
                active_index: group.active_index,
                windows,
                saved_at: chrono::Utc::now(),
            };
            if let Err(e) = save_group_state(&state, &self.state_dir) {
                warn!(
                    event = "app.engine.snapshot_save_failed",
                    group = %group.name,
                    error = %e,
                );
            }
        }
    }
}
