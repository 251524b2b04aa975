//! Command tests for restic-ez
//!
//! These tests drive the workflows behind each CLI command with mocked
//! processes and prompts.

mod backup;
mod check;
mod list;
mod restore;
