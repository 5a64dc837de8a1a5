use thiserror::Error;

use crate::domain::ReleaseLevel;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum GitReleaseError {
    /// The external `git` binary exited with a failure status.
    #[error("{message}")]
    Command {
        command: String,
        code: Option<i32>,
        message: String,
    },

    #[error("{0}")]
    VersionDetection(String),

    #[error("[release:{level}] Step '{step}' failed: {message}")]
    Release {
        level: ReleaseLevel,
        step: String,
        message: String,
    },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Changelog error: {0}")]
    Changelog(String),

    /// Command-line input that cannot be acted on.
    #[error("{0}")]
    Usage(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, GitReleaseError>;

impl GitReleaseError {
    /// Build a command failure from captured process output.
    ///
    /// Falls back to a generic message naming the command when stderr is empty.
    pub fn command(command: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        let command = command.into();
        let trimmed = stderr.trim();
        let message = if trimmed.is_empty() {
            match code {
                Some(code) => format!("Command '{}' failed with exit code {}", command, code),
                None => format!("Command '{}' was terminated by a signal", command),
            }
        } else {
            trimmed.to_string()
        };
        GitReleaseError::Command {
            command,
            code,
            message,
        }
    }

    /// Create a version detection error with context
    pub fn version_detection(msg: impl Into<String>) -> Self {
        GitReleaseError::VersionDetection(msg.into())
    }

    /// Create a release workflow error for a given step
    pub fn release(level: ReleaseLevel, step: impl Into<String>, msg: impl Into<String>) -> Self {
        GitReleaseError::Release {
            level,
            step: step.into(),
            message: msg.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitReleaseError::Config(msg.into())
    }

    /// Create a changelog error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        GitReleaseError::Changelog(msg.into())
    }

    /// Create a usage error for malformed command input
    pub fn usage(msg: impl Into<String>) -> Self {
        GitReleaseError::Usage(msg.into())
    }

    /// Process exit code the CLI should report for this error.
    ///
    /// Tool failures keep the exit code of the underlying `git` invocation.
    pub fn exit_code(&self) -> i32 {
        match self {
            GitReleaseError::Command {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}
