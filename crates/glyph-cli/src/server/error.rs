//! Server error types with recovery suggestions.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Error type for server startup and runtime failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Creates a bind error with address context.
    pub fn bind(address: impl ToString, source: io::Error) -> Self {
        Self::Bind {
            address: address.to_string(),
            source,
        }
    }

    /// Returns a short code identifying the failure class.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "E001",
            Self::Runtime(_) => "E002",
        }
    }

    fn io_error(&self) -> &io::Error {
        match self {
            Self::Bind { source, .. } => source,
            Self::Runtime(err) => err,
        }
    }

    /// Whether retrying, possibly with a different address, may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.io_error().kind(),
            io::ErrorKind::PermissionDenied
                | io::ErrorKind::AddrInUse
                | io::ErrorKind::AddrNotAvailable
                | io::ErrorKind::Interrupted
                | io::ErrorKind::TimedOut
        )
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match (self, self.io_error().kind()) {
            (_, io::ErrorKind::PermissionDenied) => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            (_, io::ErrorKind::AddrInUse) => Some(
                "The port is already in use. Try a different port or stop the conflicting service",
            ),
            (_, io::ErrorKind::AddrNotAvailable) => {
                Some("The address is not available. Check network interface configuration")
            }
            (Self::Bind { .. }, _) => Some("Check network configuration and firewall settings"),
            (Self::Runtime(_), io::ErrorKind::Interrupted) => {
                Some("The operation was interrupted, you may retry")
            }
            (Self::Runtime(_), _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_errors_have_suggestions() {
        let err = ServerError::bind(
            "127.0.0.1:3000",
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );

        assert_eq!(err.error_code(), "E001");
        assert!(err.is_recoverable());
        assert!(err.suggestion().is_some_and(|s| s.contains("already in use")));
        assert!(err.to_string().contains("127.0.0.1:3000"));
    }

    #[test]
    fn runtime_errors_may_lack_suggestions() {
        let err = ServerError::Runtime(io::Error::other("boom"));
        assert_eq!(err.error_code(), "E002");
        assert!(!err.is_recoverable());
        assert!(err.suggestion().is_none());
    }
}
