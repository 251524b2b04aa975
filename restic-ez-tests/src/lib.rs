//! Test utilities for restic-ez
//!
//! Shared builders, fixtures and a scratch-directory context for the `unit`
//! and `commands` test targets.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, TestContext, MockExecutor, MockPrompt};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::new();
//!     let config = ConfigBuilder::new()
//!         .directory(ctx.managed_dir())
//!         .build();
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::TestContext;

// Re-export types from the main crate for convenience
pub use restic_ez::config::{Config, FlagContext, ResticEnv};
pub use restic_ez::utils::restic::Snapshot;
pub use restic_ez::Error;

// Re-export mock implementations from the main crate
pub use restic_ez::utils::executor::mock::{CommandCall, MockExecutor, MockResponse};
pub use restic_ez::utils::executor::CommandExecutor;
pub use restic_ez::utils::prompt::mock::{MockPrompt, PromptCall};
pub use restic_ez::utils::prompt::Prompt;
pub use restic_ez::utils::restic_ops::mock::{MockResticOps, ResticCall};
pub use restic_ez::utils::restic_ops::ResticOperations;
