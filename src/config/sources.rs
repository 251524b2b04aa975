//! Places a configuration document can come from
//!
//! Sources are tried in order and the first one that yields a document wins:
//!
//! 1. `RESTIC_EZ_CONFIG`: the JSON document itself
//! 2. `RESTIC_EZ_CONFIG_FILE`: path to a JSON file
//! 3. A document embedded at build time from `RESTIC_EZ_EMBEDDED_CONFIG`

use super::expand_tilde;
use crate::error::{Error, Result};
use std::env::VarError;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const CONFIG_ENV: &str = "RESTIC_EZ_CONFIG";
pub const CONFIG_FILE_ENV: &str = "RESTIC_EZ_CONFIG_FILE";

/// Document compiled into the binary, the fallback when the environment has none
pub const EMBEDDED_CONFIG: Option<&str> = option_env!("RESTIC_EZ_EMBEDDED_CONFIG");

/// A named place that may hold a raw configuration document
pub trait ConfigSource {
    /// Name used in log and error messages
    fn name(&self) -> String;

    /// The raw document, `None` if this source is not set
    fn fetch(&self) -> Result<Option<String>>;
}

/// JSON document stored directly in an environment variable
#[derive(Debug, Clone)]
pub struct EnvJson {
    var: String,
}

impl EnvJson {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl ConfigSource for EnvJson {
    fn name(&self) -> String {
        self.var.clone()
    }

    fn fetch(&self) -> Result<Option<String>> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(Error::ConfigParse(format!(
                "{} is not valid UTF-8",
                self.var
            ))),
        }
    }
}

/// Environment variable naming a JSON file
#[derive(Debug, Clone)]
pub struct EnvFile {
    var: String,
}

impl EnvFile {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl ConfigSource for EnvFile {
    fn name(&self) -> String {
        self.var.clone()
    }

    fn fetch(&self) -> Result<Option<String>> {
        let Some(raw) = std::env::var_os(&self.var) else {
            return Ok(None);
        };
        let path = expand_tilde(&PathBuf::from(raw));
        debug!("Reading configuration file {:?}", path);

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| Error::ConfigRead {
                source_name: format!("{} ({})", self.var, path.display()),
                source,
            })
    }
}

/// A fixed document, such as the one embedded at build time
#[derive(Debug, Clone)]
pub struct Embedded {
    name: String,
    document: Option<String>,
}

impl Embedded {
    pub fn new(name: &str, document: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            document: document.map(str::to_string),
        }
    }

    /// The build-time embedded document
    pub fn builtin() -> Self {
        Self::new("embedded CONFIG", EMBEDDED_CONFIG)
    }
}

impl ConfigSource for Embedded {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> Result<Option<String>> {
        Ok(self.document.clone())
    }
}

/// The standard source order
pub fn default_sources() -> Vec<Box<dyn ConfigSource>> {
    vec![
        Box::new(EnvJson::new(CONFIG_ENV)),
        Box::new(EnvFile::new(CONFIG_FILE_ENV)),
        Box::new(Embedded::builtin()),
    ]
}
