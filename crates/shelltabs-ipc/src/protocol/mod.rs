//! Request model and line parser.
//!
//! Two request forms, one per line, UTF-8:
//!
//! ```text
//! OPEN <path>
//! OPEN_EX <hwnd> <path>
//! ```
//!
//! `OPEN` is the legacy form and carries no origin window. `OPEN_EX`
//! prefixes the path with the decimal handle of the window the request
//! originated from (`0` if unknown), which the engine uses to pick the
//! group that should receive the open.

use shelltabs_core::errors::ShellTabsError;
use shelltabs_core::registry::types::Hwnd;

/// Hard cap applied before any parsing.
pub const MAX_LINE_LEN: usize = 8192;
/// Maximum accepted path length, in characters.
pub const MAX_PATH_LEN: usize = 2048;

/// A successfully parsed open-folder request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    /// Origin window handle; `0` when unknown (always `0` for `OPEN`).
    pub origin: Hwnd,
    pub path: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Line exceeds {MAX_LINE_LEN} characters ({len})")]
    LineTooLong { len: usize },

    #[error("Unknown verb: '{verb}'")]
    UnknownVerb { verb: String },

    #[error("Request path is empty")]
    EmptyPath,

    #[error("Request path exceeds {MAX_PATH_LEN} characters ({len})")]
    PathTooLong { len: usize },

    #[error("Invalid hwnd: '{token}'")]
    InvalidHandle { token: String },

    #[error("OPEN_EX requires an hwnd and a path")]
    MissingField,
}

impl ShellTabsError for ProtocolError {
    fn error_code(&self) -> &'static str {
        match self {
            ProtocolError::LineTooLong { .. } => "LINE_TOO_LONG",
            ProtocolError::UnknownVerb { .. } => "UNKNOWN_VERB",
            ProtocolError::EmptyPath => "EMPTY_PATH",
            ProtocolError::PathTooLong { .. } => "PATH_TOO_LONG",
            ProtocolError::InvalidHandle { .. } => "INVALID_HWND",
            ProtocolError::MissingField => "MISSING_FIELD",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

/// Parse one request line.
///
/// The length cap is enforced before anything else so an adversarial
/// caller cannot make the parser chew on megabytes. Trailing newline and
/// carriage return are tolerated.
pub fn parse_line(line: &str) -> Result<OpenRequest, ProtocolError> {
    if line.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong { len: line.len() });
    }
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix("OPEN_EX ") {
        let Some((handle_token, raw_path)) = rest.split_once(' ') else {
            return Err(ProtocolError::MissingField);
        };
        let origin = parse_handle(handle_token)?;
        let path = validate_path(raw_path)?;
        return Ok(OpenRequest { origin, path });
    }

    if let Some(raw_path) = line.strip_prefix("OPEN ") {
        let path = validate_path(raw_path)?;
        return Ok(OpenRequest { origin: 0, path });
    }

    match line {
        "OPEN" | "OPEN_EX" => Err(ProtocolError::EmptyPath),
        other => {
            let verb = other.split_whitespace().next().unwrap_or("").to_string();
            Err(ProtocolError::UnknownVerb { verb })
        }
    }
}

/// Decimal handle that must fit the platform's native handle width.
fn parse_handle(token: &str) -> Result<Hwnd, ProtocolError> {
    token
        .parse::<Hwnd>()
        .map_err(|_| ProtocolError::InvalidHandle {
            token: token.to_string(),
        })
}

fn validate_path(raw: &str) -> Result<String, ProtocolError> {
    let path = raw.trim();
    if path.is_empty() {
        return Err(ProtocolError::EmptyPath);
    }
    let len = path.chars().count();
    if len > MAX_PATH_LEN {
        return Err(ProtocolError::PathTooLong { len });
    }
    Ok(path.to_string())
}
