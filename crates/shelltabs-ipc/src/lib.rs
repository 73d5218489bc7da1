//! shelltabs-ipc: Open-folder interception protocol
//!
//! A one-way, line-oriented protocol over a well-known local named pipe.
//! An external process (or a second shelltabs instance) asks the running
//! engine to open a folder into an existing group instead of spawning a
//! free-floating window. The server must survive malformed and
//! adversarial input indefinitely; nothing arriving on the pipe may
//! crash the host process.

pub mod client;
pub mod protocol;
pub mod server;

pub use protocol::{parse_line, OpenRequest, ProtocolError, MAX_LINE_LEN, MAX_PATH_LEN};
pub use server::{serve_connection, LogThrottle, OpenHandler, ServerConfig};

#[cfg(windows)]
pub use server::pipe::run_server;
