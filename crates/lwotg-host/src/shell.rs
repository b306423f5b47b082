//! Shell command execution for host networking.
//!
//! Commands are composed as strings and run through `/bin/sh -c`. Every
//! value interpolated into a command must pass through [`shellquote`].
//!
//! ```ignore
//! use lwotg_host::shell::{self, shellquote};
//!
//! let cmd = format!("/sbin/ip address add {} dev {}",
//!     shellquote("192.0.2.1/31"), shellquote("eth0"));
//! shell::exec_checked(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{HostError, HostResult};

/// Default path of the `ip` command.
pub const IP_CMD: &str = "/sbin/ip";

/// Default path of the `arping` command.
pub const ARPING_CMD: &str = "/usr/sbin/arping";

/// Characters that keep a special meaning inside double quotes:
/// `$`, backtick, `"`, `\` and newline. A newline is prefixed with a
/// backslash like the others, which the shell reads as a line
/// continuation and removes.
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Wraps `s` in double quotes, escaping characters the shell would
/// otherwise interpret.
///
/// Newlines do not survive quoting: `a\nb` reaches the command as `ab`.
/// Callers must reject values containing newlines if that matters.
///
/// ```
/// use lwotg_host::shell::shellquote;
///
/// assert_eq!(shellquote("eth0"), "\"eth0\"");
/// assert_eq!(shellquote("a$b"), "\"a\\$b\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Outcome of a finished command.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout and stderr joined for error messages.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    /// Converts a non-zero exit into [`HostError::ShellCommandFailed`].
    pub fn into_checked(self, cmd: &str) -> HostResult<String> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(HostError::ShellCommandFailed {
                command: cmd.to_string(),
                exit_code: self.exit_code,
                output: self.combined_output(),
            })
        }
    }
}

/// Runs `cmd` through `/bin/sh -c` and captures its output.
///
/// Only a failure to spawn is an error; inspect [`ExecResult::success`]
/// for the exit status.
pub async fn exec(cmd: &str) -> HostResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| HostError::ShellExec {
            command: cmd.to_string(),
            source: e,
        })?;

    let result = ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(command = %cmd, "Command succeeded");
    } else {
        tracing::debug!(
            command = %cmd,
            exit_code = result.exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Runs `cmd` and returns its stdout, failing on a non-zero exit.
pub async fn exec_checked(cmd: &str) -> HostResult<String> {
    exec(cmd).await?.into_checked(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shellquote_plain() {
        assert_eq!(shellquote("eth0"), "\"eth0\"");
        assert_eq!(shellquote("192.0.2.1/31"), "\"192.0.2.1/31\"");
        assert_eq!(shellquote(""), "\"\"");
    }

    #[test]
    fn test_shellquote_special_chars() {
        assert_eq!(shellquote("$IFACE"), "\"\\$IFACE\"");
        assert_eq!(shellquote("`reboot`"), "\"\\`reboot\\`\"");
        assert_eq!(shellquote("a\"b"), "\"a\\\"b\"");
        assert_eq!(shellquote("a\\b"), "\"a\\\\b\"");
        assert_eq!(shellquote("a\nb"), "\"a\\\nb\"");
    }

    #[test]
    fn test_combined_output() {
        let mut result = ExecResult {
            exit_code: 0,
            stdout: "out".to_string(),
            stderr: String::new(),
        };
        assert_eq!(result.combined_output(), "out");

        result.stderr = "err".to_string();
        assert_eq!(result.combined_output(), "out\nerr");

        result.stdout.clear();
        assert_eq!(result.combined_output(), "err");
    }

    #[test]
    fn test_into_checked() {
        let failed = ExecResult {
            exit_code: 2,
            stdout: String::new(),
            stderr: "RTNETLINK answers: File exists".to_string(),
        };
        let err = failed.into_checked("ip address add").unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_exec_captures_stdout() {
        let result = exec("echo eth0").await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "eth0");
    }

    #[tokio::test]
    async fn test_quoted_newline_is_line_continuation() {
        let result = exec(&format!("printf %s {}", shellquote("a\nb"))).await.unwrap();
        assert_eq!(result.stdout, "ab");
    }

    #[tokio::test]
    async fn test_exec_checked_failure() {
        match exec_checked("exit 3").await {
            Err(HostError::ShellCommandFailed { exit_code, .. }) => assert_eq!(exit_code, 3),
            other => panic!("expected ShellCommandFailed, got {:?}", other),
        }
    }
}
