use crate::errors::ShellTabsError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ShellTabsError for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            SessionError::IoError { .. } => "SESSION_IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_code() {
        let error = SessionError::IoError {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(error.error_code(), "SESSION_IO_ERROR");
        assert!(!error.is_user_error());
    }
}
