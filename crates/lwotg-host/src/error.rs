//! Error types for host networking operations.

use std::io;
use thiserror::Error;

/// Result type alias for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur while mutating host networking state.
#[derive(Debug, Error)]
pub enum HostError {
    /// Failed to spawn a shell command.
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        command: String,
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Interface name rejected by validation.
    #[error("Interface '{name}' is not configurable: {reason}")]
    InvalidInterface { name: String, reason: String },
}

impl HostError {
    pub fn invalid_interface(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInterface {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the kernel reported that the object already exists.
    pub fn is_already_exists(&self) -> bool {
        match self {
            HostError::ShellCommandFailed { output, .. } => output.contains("File exists"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_failed_display() {
        let err = HostError::ShellCommandFailed {
            command: "/sbin/ip address add \"192.0.2.1/31\" dev \"eth9\"".to_string(),
            exit_code: 1,
            output: "Cannot find device \"eth9\"".to_string(),
        };
        assert!(err.to_string().contains("exit code 1"));
        assert!(err.to_string().contains("Cannot find device"));
        assert!(!err.is_already_exists());
    }

    #[test]
    fn test_already_exists() {
        let err = HostError::ShellCommandFailed {
            command: "ip address add".to_string(),
            exit_code: 2,
            output: "RTNETLINK answers: File exists".to_string(),
        };
        assert!(err.is_already_exists());
        assert!(!HostError::invalid_interface("eth0", "missing").is_already_exists());
    }

    #[test]
    fn test_invalid_interface_display() {
        let err = HostError::invalid_interface("eth/0", "contains '/'");
        assert_eq!(
            err.to_string(),
            "Interface 'eth/0' is not configurable: contains '/'"
        );
    }
}
