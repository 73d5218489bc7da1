//! Request sender used by a second shelltabs instance.
//!
//! `shelltabs open <path>` connects to the running engine's pipe, writes
//! one request line, and exits without starting a second engine.

use shelltabs_core::registry::types::Hwnd;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No interception server is listening on '{pipe_name}'")]
    NotRunning { pipe_name: String },

    #[error("IO error talking to the interception server: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl shelltabs_core::errors::ShellTabsError for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            ClientError::NotRunning { .. } => "IPC_SERVER_NOT_RUNNING",
            ClientError::IoError { .. } => "IPC_CLIENT_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ClientError::NotRunning { .. })
    }
}

/// Format one request line for the wire.
pub fn format_request(origin: Hwnd, path: &str) -> String {
    format!("OPEN_EX {} {}\n", origin, path.trim())
}

#[cfg(windows)]
pub use windows_impl::send_open;

#[cfg(windows)]
mod windows_impl {
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;
    use tokio::net::windows::named_pipe::ClientOptions;
    use tracing::debug;

    use super::{format_request, ClientError};
    use shelltabs_core::registry::types::Hwnd;

    /// All pipe instances busy; retry shortly.
    const ERROR_PIPE_BUSY: i32 = 231;
    const CONNECT_ATTEMPTS: u32 = 5;
    const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(50);

    /// Send one open request to the running engine.
    pub async fn send_open(
        pipe_name: &str,
        origin: Hwnd,
        path: &str,
    ) -> Result<(), ClientError> {
        let mut client = None;
        for attempt in 1..=CONNECT_ATTEMPTS {
            match ClientOptions::new().open(pipe_name) {
                Ok(pipe) => {
                    client = Some(pipe);
                    break;
                }
                Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY) => {
                    debug!(
                        event = "ipc.client.pipe_busy",
                        attempt = attempt,
                    );
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(ClientError::NotRunning {
                        pipe_name: pipe_name.to_string(),
                    });
                }
                Err(e) => return Err(ClientError::IoError { source: e }),
            }
        }
        let Some(mut pipe) = client else {
            return Err(ClientError::NotRunning {
                pipe_name: pipe_name.to_string(),
            });
        };

        let line = format_request(origin, path);
        pipe.write_all(line.as_bytes()).await?;
        pipe.flush().await?;
        debug!(event = "ipc.client.request_sent", origin = origin, path = %path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_request_shape() {
        assert_eq!(format_request(0, "/tmp/a"), "OPEN_EX 0 /tmp/a\n");
        assert_eq!(
            format_request(12345, "  C:\\Users\\me  "),
            "OPEN_EX 12345 C:\\Users\\me\n"
        );
    }

    #[test]
    fn test_formatted_request_parses_back() {
        let line = format_request(77, "C:\\My Folder");
        let parsed = crate::protocol::parse_line(&line).unwrap();
        assert_eq!(parsed.origin, 77);
        assert_eq!(parsed.path, "C:\\My Folder");
    }
}
