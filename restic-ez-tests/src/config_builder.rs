//! Fluent API for building test configurations
//!
//! Builds the JSON document restic-ez reads, with literal secrets by default.

use restic_ez::config::{Config, FlagContext};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Builder for configuration documents
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    directory: PathBuf,
    restic: Map<String, Value>,
    s3: Map<String, Value>,
    extra: Map<String, Value>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Document with literal secrets and a local repository
    pub fn new() -> Self {
        let mut restic = Map::new();
        restic.insert("pass".to_string(), json!("test-password-123"));
        restic.insert("repo".to_string(), json!("/tmp/restic-ez-test-repo"));

        let mut s3 = Map::new();
        s3.insert("user".to_string(), json!("AKIATEST"));
        s3.insert("pass".to_string(), json!("s3-secret"));

        Self {
            directory: PathBuf::from("/srv/data"),
            restic,
            s3,
            extra: Map::new(),
        }
    }

    pub fn directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    pub fn repo(mut self, repo: &str) -> Self {
        self.restic.insert("repo".to_string(), json!(repo));
        self
    }

    pub fn restic_pass(mut self, pass: &str) -> Self {
        self.restic.insert("pass".to_string(), json!(pass));
        self
    }

    /// Replace the literal restic password by a command printing it
    pub fn restic_pass_command(mut self, command: &str) -> Self {
        self.restic.remove("pass");
        self.restic.insert("pass_command".to_string(), json!(command));
        self
    }

    /// Leave the restic password out so it has to be asked for
    pub fn without_restic_pass(mut self) -> Self {
        self.restic.remove("pass");
        self
    }

    pub fn s3_user(mut self, user: &str) -> Self {
        self.s3.insert("user".to_string(), json!(user));
        self
    }

    /// Replace the literal S3 secret by a command printing it
    pub fn s3_pass_command(mut self, command: &str) -> Self {
        self.s3.remove("pass");
        self.s3.insert("pass_command".to_string(), json!(command));
        self
    }

    pub fn without_s3_pass(mut self) -> Self {
        self.s3.remove("pass");
        self
    }

    /// Extra restic arguments for one context
    pub fn flags(mut self, context: FlagContext, flags: &[&str]) -> Self {
        self.restic.insert(context.key(), json!(flags));
        self
    }

    /// Unknown top-level key, kept in the resolved document
    pub fn extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// The raw document
    pub fn document(&self) -> Value {
        let mut document = self.extra.clone();
        document.insert(
            "directory".to_string(),
            json!(self.directory.to_string_lossy()),
        );
        document.insert("restic".to_string(), Value::Object(self.restic.clone()));
        document.insert("s3".to_string(), Value::Object(self.s3.clone()));
        Value::Object(document)
    }

    pub fn to_json(&self) -> String {
        self.document().to_string()
    }

    /// Typed configuration; all secrets must be literal
    pub fn build(&self) -> Config {
        Config::from_document(self.document()).expect("Failed to build test config")
    }
}
