pub mod logging;
pub mod restore;
pub mod workflows;

pub use restore::{RestoreStep, RestoreWorkflow};
pub use workflows::Workflows;
