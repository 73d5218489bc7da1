pub fn handle_run_command() -> Result<(), Box<dyn std::error::Error>> {
    run_engine()
}

#[cfg(windows)]
fn run_engine() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc::unbounded_channel;
    use tracing::info;

    use shelltabs_core::config::{config_file_path, load_or_default, loading};
    use shelltabs_core::ShellTabsConfig;
    use shelltabs_ipc::server::pipe::run_server;
    use shelltabs_ipc::{OpenHandler, ServerConfig};
    use shelltabs_win::native::win32::Win32WindowOps;
    use shelltabs_win::shell::com::{ComApartment, ComShellWindows};
    use shelltabs_win::sources::{GenericSource, ShellWatcher, ShellWatcherConfig};

    use crate::engine::opener::ShellFolderOpener;
    use crate::engine::Engine;

    fn watcher_config(config: &ShellTabsConfig) -> ShellWatcherConfig {
        ShellWatcherConfig {
            retry_attempts: config.resilience.retry_attempts(),
            retry_delay: Duration::from_millis(config.resilience.retry_delay_ms()),
            backoff_min: Duration::from_millis(config.resilience.backoff_min_ms()),
            backoff_max: Duration::from_millis(config.resilience.backoff_max_ms()),
            failure_threshold: config.resilience.failure_threshold(),
            failure_window: Duration::from_millis(config.resilience.failure_window_ms()),
            cooldown: Duration::from_millis(config.resilience.cooldown_ms()),
            poll_interval: Duration::from_millis(config.host.shell_poll_ms()),
        }
    }

    let config = load_or_default(&config_file_path());
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let ops = Arc::new(Win32WindowOps);
        let engine = Engine::new(
            config.clone(),
            loading::state_dir(),
            ops.clone(),
            Arc::new(ShellFolderOpener),
        );
        let cancel = engine.cancel_token();

        let (raw_tx, raw_rx) = unbounded_channel();
        let (shell_tx, shell_rx) = unbounded_channel();

        let generic = Arc::new(GenericSource::new(ops.clone(), raw_tx));
        generic.start();

        let watcher = ShellWatcher::new(
            Arc::new(ComShellWindows::new()),
            watcher_config(&config),
            shell_tx,
            cancel.clone(),
        );
        let watcher_handle = std::thread::Builder::new()
            .name("shelltabs-shell-watcher".to_string())
            .spawn(move || {
                let _com = ComApartment::initialize();
                watcher.run();
            })?;

        let handler: OpenHandler = {
            let engine = engine.clone();
            Arc::new(move |request| {
                let engine = engine.clone();
                Box::pin(async move {
                    engine.open_or_activate(&request);
                    Ok(())
                })
            })
        };
        let server = tokio::spawn(run_server(
            ServerConfig::new(config.ipc.pipe_name.clone()),
            handler,
            cancel.clone(),
        ));

        // Let the seed enumeration land in the registry before re-matching
        // persisted groups against it.
        let restore_engine = engine.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            restore_engine.restore_session();
        });

        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(event = "app.run.shutdown_signal_received");
                signal_cancel.cancel();
            }
        });

        engine.run(raw_rx, shell_rx).await;

        generic.stop();
        engine.shutdown();
        if watcher_handle.join().is_err() {
            tracing::warn!(event = "app.run.watcher_join_failed");
        }
        let _ = server.await;
        Ok(())
    })
}

#[cfg(not(windows))]
fn run_engine() -> Result<(), Box<dyn std::error::Error>> {
    Err("shelltabs manages native Windows windows and only runs on Windows".into())
}
