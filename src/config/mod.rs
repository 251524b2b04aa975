//! Configuration module for restic-ez
//!
//! The configuration is a small JSON document:
//!
//! ```json
//! {
//!   "directory": "/srv/data",
//!   "restic": { "pass_command": "pass show restic", "repo": "s3:host/bucket",
//!               "flags_backup": ["--exclude-caches"] },
//!   "s3": { "user": "AKIA...", "pass": "..." }
//! }
//! ```
//!
//! `restic.pass` and `s3.pass` may be replaced by `pass_command`, a shell
//! command printing the secret. If neither is given the user is asked.
//!
//! ## Example Usage
//!
//! ```no_run
//! use restic_ez::config;
//! use restic_ez::utils::executor::RealExecutor;
//! use restic_ez::utils::prompt::default_prompt;
//!
//! let prompt = default_prompt();
//! let config = config::load_config(&RealExecutor::new(), &*prompt)?;
//! println!("Managed directory: {}", config.directory().display());
//! # Ok::<(), restic_ez::Error>(())
//! ```

pub mod environment;
mod loader;
pub mod sources;
mod types;

pub use environment::ResticEnv;
pub use loader::{load_config, resolve_document, ConfigLoader, SECRET_FIELDS};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
