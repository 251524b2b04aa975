//! Test context and harness
//!
//! Owns a scratch directory holding the managed directory and, when needed, a
//! configuration file.

use crate::config_builder::ConfigBuilder;
use restic_ez::config::sources::{ConfigSource, Embedded};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory for test files
    temp_dir: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the managed directory, not created
    pub fn managed_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Create the managed directory with the given files
    pub fn populate_managed_dir(&self, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.managed_dir();
        fs::create_dir_all(&dir).expect("Failed to create managed directory");
        for (name, content) in files {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            fs::write(&path, content).expect("Failed to write file");
        }
        dir
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Builder pointing at this context's managed directory
    pub fn config_builder(&self) -> ConfigBuilder {
        ConfigBuilder::new().directory(self.managed_dir())
    }

    /// Write the builder's document to `config.json`
    pub fn write_config(&self, builder: &ConfigBuilder) -> PathBuf {
        self.create_file("config.json", &builder.to_json())
    }

    /// A single configuration source serving the builder's document
    pub fn sources(&self, builder: &ConfigBuilder) -> Vec<Box<dyn ConfigSource>> {
        vec![Box::new(Embedded::new("test config", Some(builder.to_json().as_str())))]
    }
}
