//! restic-ez library
//!
//! Drives restic for a single managed directory: listing, backing up,
//! restoring, checking and unlocking an archive repository whose settings and
//! secrets come from a small JSON configuration.

pub mod config;
pub mod error;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, Config, FlagContext, ResticEnv};
pub use error::{Error, Result};
pub use managers::logging::{init_logging, LogGuard, LoggingConfig};
pub use managers::{RestoreWorkflow, Workflows};
