use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Spawn,
    Subprocess,
    Parse,
    Io,
}

/// Failure of a public operation.
///
/// Variants that come from a subprocess carry the invoked command line so a
/// caller can tell which tool failed and how.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to spawn process: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Subprocess {
        message: String,
        command: String,
        exit_code: Option<i32>,
        signal: Option<i32>,
    },

    #[error("process output exceeded max buffer of {max_buffer} bytes")]
    OutputLimit { command: String, max_buffer: usize },

    #[error("process exceeded timeout of {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("failed to parse {what} output: {reason}")]
    Parse {
        what: &'static str,
        reason: String,
        command: Option<String>,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) | Error::NotFound { .. } => ErrorKind::Input,
            Error::Spawn { .. } => ErrorKind::Spawn,
            Error::Subprocess { .. } | Error::OutputLimit { .. } | Error::Timeout { .. } => {
                ErrorKind::Subprocess
            }
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// The command line of the subprocess this error originated from, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Error::Spawn { command, .. }
            | Error::Subprocess { command, .. }
            | Error::OutputLimit { command, .. }
            | Error::Timeout { command, .. } => Some(command),
            Error::Parse { command, .. } => command.as_deref(),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Subprocess { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}
