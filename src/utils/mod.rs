pub mod command;
pub mod restic;

// Trait-based abstractions for testability
pub mod executor;
pub mod prompt;
pub mod restic_ops;

// Re-export commonly used types and traits (used by test crate)
pub use executor::{CommandExecutor, RealExecutor};
pub use prompt::{default_prompt, Prompt};
pub use restic_ops::{RealResticOps, ResticOperations};
