//! Error taxonomy surfaced by the control server.
//!
//! Every error names the offending entity (port, Ethernet endpoint,
//! interface or address) in its message.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for server operations.
pub type OtgResult<T> = Result<T, OtgError>;

/// Errors returned by SetConfig, SetProtocolState and configuration
/// handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtgError {
    /// Malformed or inconsistent input; the caller must resubmit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Feature intentionally unsupported by this server.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// Host mutation failed or the embedder wired the server incorrectly.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Machine-readable error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Unimplemented,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::Unimplemented => "unimplemented",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OtgError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::Unimplemented(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            OtgError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            OtgError::Unimplemented(_) => ErrorCode::Unimplemented,
            OtgError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OtgError::InvalidArgument(m) | OtgError::Unimplemented(m) | OtgError::Internal(m) => m,
        }
    }

    /// Returns true if resubmitting the same request may succeed.
    ///
    /// Reconciliation skips addresses it has already applied, so retrying
    /// after a host failure is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OtgError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OtgError::invalid_argument("port p1 does not specify a location");
        assert_eq!(
            err.to_string(),
            "invalid argument: port p1 does not specify a location"
        );
        assert_eq!(err.message(), "port p1 does not specify a location");
    }

    #[test]
    fn test_codes() {
        assert_eq!(OtgError::invalid_argument("x").code(), ErrorCode::InvalidArgument);
        assert_eq!(OtgError::unimplemented("x").code(), ErrorCode::Unimplemented);
        assert_eq!(OtgError::internal("x").code().as_str(), "internal");
    }

    #[test]
    fn test_is_retryable() {
        assert!(OtgError::internal("add failed").is_retryable());
        assert!(!OtgError::invalid_argument("bad prefix").is_retryable());
        assert!(!OtgError::unimplemented("lags").is_retryable());
    }
}
