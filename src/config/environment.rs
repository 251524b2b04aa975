//! Environment handed to restic and other delegated processes

use super::types::Config;
use std::collections::BTreeMap;

/// Re-serialized resolved configuration
pub const CONFIG_VAR: &str = "RESTIC_EZ_CONFIG";
pub const DIRECTORY_VAR: &str = "DIRECTORY";
pub const PASSWORD_VAR: &str = "RESTIC_PASSWORD";
pub const REPOSITORY_VAR: &str = "RESTIC_REPOSITORY";
pub const S3_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const S3_SECRET_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Environment variables for restic
///
/// An overlay: the variables are added to the ambient environment of each
/// child process, this process's own environment is left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResticEnv {
    vars: BTreeMap<String, String>,
}

impl ResticEnv {
    /// Derive the environment from a resolved configuration
    pub fn from_config(config: &Config) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert(CONFIG_VAR.to_string(), config.to_json());
        vars.insert(
            DIRECTORY_VAR.to_string(),
            config.directory().display().to_string(),
        );
        vars.insert(PASSWORD_VAR.to_string(), config.restic().pass.clone());
        vars.insert(REPOSITORY_VAR.to_string(), config.restic().repo.clone());
        vars.insert(S3_KEY_ID_VAR.to_string(), config.s3().user.clone());
        vars.insert(S3_SECRET_VAR.to_string(), config.s3().pass.clone());
        Self { vars }
    }

    /// Add custom environment variable
    pub fn add(&mut self, key: String, value: String) {
        self.vars.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Get all environment variables
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}
