use super::environment::ResticEnv;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Operation contexts that can carry extra restic flags (`restic.flags_<context>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlagContext {
    Backup,
    Restore,
    Check,
    BreakLock,
    List,
}

impl FlagContext {
    pub const ALL: [FlagContext; 5] = [
        FlagContext::Backup,
        FlagContext::Restore,
        FlagContext::Check,
        FlagContext::BreakLock,
        FlagContext::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagContext::Backup => "backup",
            FlagContext::Restore => "restore",
            FlagContext::Check => "check",
            FlagContext::BreakLock => "break_lock",
            FlagContext::List => "list",
        }
    }

    /// Key of this context inside the `restic` section
    pub fn key(&self) -> String {
        format!("flags_{}", self.as_str())
    }
}

impl fmt::Display for FlagContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document layout, only used to deserialize a resolved document
#[derive(Debug, Deserialize)]
struct ConfigDocument {
    directory: PathBuf,
    restic: ResticDocument,
    s3: S3Config,
}

#[derive(Debug, Deserialize)]
struct ResticDocument {
    pass: String,
    repo: String,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

/// Restic repository settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResticConfig {
    pub pass: String,
    pub repo: String,
    /// Extra arguments per context, keyed by context name
    pub flags: BTreeMap<String, Vec<String>>,
}

/// S3 storage credentials forwarded to restic
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct S3Config {
    pub user: String,
    pub pass: String,
}

/// A resolved configuration
///
/// Built once all secrets are literal values; never changes afterwards. The
/// resolved JSON document is kept alongside the typed fields so it can be
/// handed to child processes unchanged (unknown keys included).
#[derive(Debug, Clone)]
pub struct Config {
    directory: PathBuf,
    restic: ResticConfig,
    s3: S3Config,
    document: Value,
}

impl Config {
    /// Build a configuration from a document whose secrets are already resolved
    pub fn from_document(document: Value) -> Result<Self> {
        let parsed: ConfigDocument = serde_json::from_value(document.clone())
            .map_err(|e| Error::ConfigParse(e.to_string()))?;

        let mut flags = BTreeMap::new();
        for (key, value) in parsed.restic.rest {
            let Some(context) = key.strip_prefix("flags_") else {
                continue;
            };
            let list: Vec<String> = serde_json::from_value(value).map_err(|_| {
                Error::ConfigParse(format!("restic.{} must be a list of strings", key))
            })?;
            flags.insert(context.to_string(), list);
        }

        Ok(Self {
            directory: parsed.directory,
            restic: ResticConfig {
                pass: parsed.restic.pass,
                repo: parsed.restic.repo,
                flags,
            },
            s3: parsed.s3,
            document,
        })
    }

    /// The managed directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn restic(&self) -> &ResticConfig {
        &self.restic
    }

    pub fn s3(&self) -> &S3Config {
        &self.s3
    }

    /// Extra restic flags for `context`, empty when none are configured
    pub fn flags(&self, context: FlagContext) -> &[String] {
        self.restic
            .flags
            .get(context.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The resolved document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Compact JSON of the resolved document
    pub fn to_json(&self) -> String {
        self.document.to_string()
    }

    /// Environment for delegated processes
    pub fn environment(&self) -> ResticEnv {
        ResticEnv::from_config(self)
    }
}
