//! Named-pipe accept loop.
//!
//! One long-lived task per listening endpoint. Channel-level failures are
//! logged and the loop recreates the pipe after a short delay instead of
//! terminating; a broken client must never take the server down with it.

use std::sync::Arc;

use tokio::net::windows::named_pipe::{NamedPipeServer, PipeMode, ServerOptions};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::server::{serve_connection, LogThrottle, OpenHandler, ServerConfig};

/// Run the interception server until cancellation.
pub async fn run_server(config: ServerConfig, handler: OpenHandler, cancel: CancellationToken) {
    let throttle = Arc::new(LogThrottle::default());
    let mut is_first_instance = true;

    info!(
        event = "ipc.server.started",
        pipe_name = %config.pipe_name,
        max_instances = config.max_instances,
    );

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let server = match create_instance(&config, is_first_instance) {
            Ok(server) => {
                is_first_instance = false;
                server
            }
            Err(e) => {
                error!(
                    event = "ipc.server.pipe_create_failed",
                    pipe_name = %config.pipe_name,
                    error = %e,
                );
                if is_first_instance {
                    error!(
                        event = "ipc.server.pipe_name_taken",
                        message = "Is another shelltabs instance already running?"
                    );
                }
                tokio::select! {
                    _ = tokio::time::sleep(config.restart_delay) => continue,
                    _ = cancel.cancelled() => break,
                }
            }
        };

        tokio::select! {
            result = server.connect() => {
                match result {
                    Ok(()) => {
                        debug!(event = "ipc.server.client_connected");
                        let handler = handler.clone();
                        let throttle = throttle.clone();
                        let cancel = cancel.clone();
                        tokio::spawn(async move {
                            serve_connection(server, handler, throttle, cancel).await;
                        });
                    }
                    Err(e) => {
                        error!(
                            event = "ipc.server.accept_failed",
                            error = %e,
                        );
                        tokio::select! {
                            _ = tokio::time::sleep(config.restart_delay) => {},
                            _ = cancel.cancelled() => break,
                        }
                    }
                }
            }
            _ = cancel.cancelled() => break,
        }
    }

    info!(event = "ipc.server.stopped", pipe_name = %config.pipe_name);
}

fn create_instance(
    config: &ServerConfig,
    is_first_instance: bool,
) -> std::io::Result<NamedPipeServer> {
    ServerOptions::new()
        .first_pipe_instance(is_first_instance)
        .pipe_mode(PipeMode::Byte)
        .max_instances(config.max_instances)
        .create(&config.pipe_name)
}
