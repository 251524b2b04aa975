//! Error types for restic-ez

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for restic-ez operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for restic-ez
///
/// Every external process failure maps onto the variant of the operation that
/// ran it, so the CLI can report which step aborted.
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------
    #[error("No configuration found (tried: {tried})")]
    ConfigSource { tried: String },

    #[error("Failed to read configuration from {source_name}: {source}")]
    ConfigRead {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigParse(String),

    #[error("Secret command for \"{section}->{field}\" failed with exit code {code:?}")]
    SecretCommand {
        section: String,
        field: String,
        code: Option<i32>,
    },

    #[error("Action cancelled by user")]
    UserCancelled,

    #[error("Interactive prompt failed: {0}")]
    Prompt(String),

    // -------------------------------------------------------------------------
    // Restic operations
    // -------------------------------------------------------------------------
    #[error("Failed to list archives: {0}")]
    List(String),

    #[error("Backup failed with exit code {0:?}")]
    Backup(Option<i32>),

    #[error("Restore failed with exit code {0:?}")]
    Restore(Option<i32>),

    #[error("Repository check failed with exit code {0:?}")]
    Check(Option<i32>),

    #[error("Unlocking repository failed with exit code {0:?}")]
    Unlock(Option<i32>),

    #[error("No archive available to restore (only snapshot archives found)")]
    NoArchive,

    // -------------------------------------------------------------------------
    // Process and filesystem
    // -------------------------------------------------------------------------
    #[error("Failed to execute {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command {program} exited with code {code:?}")]
    CommandFailed { program: String, code: Option<i32> },

    #[error("Filesystem operation on '{}' failed: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether the error comes from the user declining or cancelling a prompt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}
