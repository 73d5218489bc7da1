//! Interception server core.
//!
//! The per-connection loop is transport-generic: it reads length-capped
//! lines from any `AsyncRead`, parses them, and dispatches valid requests
//! to the caller-supplied handler. The Windows named-pipe accept loop
//! lives in [`pipe`] and is only compiled on Windows.

#[cfg(windows)]
pub mod pipe;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use shelltabs_core::resilience::FailureWindow;

use crate::protocol::{parse_line, OpenRequest, ProtocolError, MAX_LINE_LEN};

/// Caller-supplied asynchronous open handler.
///
/// Failures are caught and logged per request; they never terminate the
/// connection loop, let alone the server.
pub type OpenHandler = Arc<
    dyn Fn(
            OpenRequest,
        )
            -> Pin<Box<dyn Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send>>
        + Send
        + Sync,
>;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Well-known local channel name.
    pub pipe_name: String,
    /// Concurrent pipe instances (simultaneous clients).
    pub max_instances: usize,
    /// Pause before recreating the channel after an I/O error.
    pub restart_delay: Duration,
}

impl ServerConfig {
    pub fn new(pipe_name: impl Into<String>) -> Self {
        Self {
            pipe_name: pipe_name.into(),
            max_instances: 4,
            restart_delay: Duration::from_secs(1),
        }
    }
}

/// Rate limiter for invalid-request logging.
///
/// A malicious or buggy caller can spray malformed lines far faster than
/// a log should grow. Past `burst` rejections within `window`, further
/// invalid-request logs are suppressed; exactly one "throttled" notice
/// marks the transition.
pub struct LogThrottle {
    burst: usize,
    window: Duration,
    rejections: Mutex<FailureWindow>,
    throttled: AtomicBool,
}

/// What the caller should do with one invalid-request log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Log,
    NoticeThrottled,
    Suppress,
}

impl LogThrottle {
    pub fn new(burst: usize, window: Duration) -> Self {
        Self {
            burst,
            window,
            rejections: Mutex::new(FailureWindow::new()),
            throttled: AtomicBool::new(false),
        }
    }

    pub fn decide(&self) -> ThrottleDecision {
        let recent = {
            let mut rejections = self.rejections.lock();
            rejections.record();
            rejections.count_recent(self.window)
        };
        if recent <= self.burst {
            self.throttled.store(false, Ordering::Relaxed);
            ThrottleDecision::Log
        } else if !self.throttled.swap(true, Ordering::Relaxed) {
            ThrottleDecision::NoticeThrottled
        } else {
            ThrottleDecision::Suppress
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(10))
    }
}

fn log_invalid_request(throttle: &LogThrottle, error: &ProtocolError) {
    match throttle.decide() {
        ThrottleDecision::Log => {
            warn!(
                event = "ipc.server.invalid_request",
                error = %error,
            );
        }
        ThrottleDecision::NoticeThrottled => {
            warn!(
                event = "ipc.server.invalid_request_logging_throttled",
                message = "Further invalid-request logs suppressed"
            );
        }
        ThrottleDecision::Suppress => {}
    }
}

/// Serve one client connection until EOF, I/O error or cancellation.
///
/// Malformed lines are rejected and logged (rate-limited); the
/// connection keeps serving subsequent lines. An over-long line is
/// rejected without being accumulated: the codec discards until the next
/// newline and resumes.
pub async fn serve_connection<R>(
    reader: R,
    handler: OpenHandler,
    throttle: Arc<LogThrottle>,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LEN));

    loop {
        tokio::select! {
            item = lines.next() => {
                match item {
                    Some(Ok(line)) => {
                        match parse_line(&line) {
                            Ok(request) => {
                                debug!(
                                    event = "ipc.server.request_received",
                                    origin = request.origin,
                                    path = %request.path,
                                );
                                if let Err(e) = handler(request).await {
                                    warn!(
                                        event = "ipc.server.handler_failed",
                                        error = %e,
                                    );
                                }
                            }
                            Err(e) => log_invalid_request(&throttle, &e),
                        }
                    }
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        log_invalid_request(
                            &throttle,
                            &ProtocolError::LineTooLong { len: MAX_LINE_LEN + 1 },
                        );
                    }
                    Some(Err(LinesCodecError::Io(e))) => {
                        warn!(
                            event = "ipc.server.connection_read_error",
                            error = %e,
                        );
                        break;
                    }
                    None => {
                        debug!(event = "ipc.server.connection_closed");
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => {
                debug!(event = "ipc.server.connection_cancelled");
                break;
            }
        }
    }
}
