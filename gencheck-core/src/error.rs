//! Error types for gencheck-core.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// All errors that can abort a verification run.
///
/// Drift is not an error; it is reported through [`crate::VerifyReport`].
#[derive(Debug, Error)]
pub enum VerifyError {
    /// No emit command was supplied.
    #[error("no emit command given")]
    EmptyCommand,

    /// A `--path` pattern could not be parsed as a glob.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Pattern expansion produced an empty target set.
    #[error("no files matched: {}", .patterns.join(", "))]
    NoFilesMatched { patterns: Vec<String> },

    /// A target is the working directory itself.
    #[error("'{path}' is the working directory; only files can be verified")]
    InvalidTarget { path: PathBuf },

    /// A target resolves outside the working directory.
    #[error("'{path}' resolves outside the working directory {root}")]
    PathEscapesRoot { path: PathBuf, root: PathBuf },

    /// A shadow copy left behind by an earlier run already exists.
    #[error("stale temp file '{shadow}' exists; a previous run did not clean up, remove it and retry")]
    StaleTempFile { shadow: PathBuf },

    /// The emit command could not be started.
    #[error("failed to start emit command `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The emit command ran but exited unsuccessfully.
    #[error("emit command `{command}` failed ({status})")]
    CommandFailed { command: String, status: ExitStatus },

    /// The run received a termination signal while the emit command was running.
    #[error("emit command `{command}` interrupted by {signal}")]
    Interrupted {
        command: String,
        signal: &'static str,
    },

    /// A target or its shadow copy does not hold UTF-8 text.
    #[error("'{path}' is not valid UTF-8 text: {source}")]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// One or more shadow copies could not be moved back.
    #[error("failed to restore {} file(s): {}", .failures.len(), join_failures(.failures))]
    RestoreFailed { failures: Vec<RestoreFailure> },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VerifyError {
    /// Convenience constructor for [`VerifyError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures raised before any file was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyCommand
                | Self::InvalidPattern { .. }
                | Self::NoFilesMatched { .. }
                | Self::InvalidTarget { .. }
                | Self::PathEscapesRoot { .. }
                | Self::StaleTempFile { .. }
        )
    }
}

/// A single shadow copy that could not be moved back over its target.
#[derive(Debug)]
pub struct RestoreFailure {
    pub shadow: PathBuf,
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl fmt::Display for RestoreFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.shadow.display(),
            self.path.display(),
            self.source
        )
    }
}

fn join_failures(failures: &[RestoreFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from loading a `gencheck.yaml` config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
