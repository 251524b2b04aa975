//! Restic subprocess utilities
//!
//! Argument assembly and output parsing for the restic commands used by the
//! workflows. Every call gets a fresh environment derived from the config.

use super::executor::{CommandExecutor, CommandOutput, CommandSpec, OutputMode};
use crate::config::{Config, FlagContext};
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the restic program
pub const RESTIC_BIN_ENV: &str = "RESTIC_EZ_RESTIC_BIN";

/// Tag of the safety archive taken right before a restore
pub const SNAPSHOT_TAG: &str = "snapshot";

/// Tag of regular backups
pub const BACKUP_TAG: &str = "backup";

/// Get the restic binary path
pub fn restic_binary() -> String {
    std::env::var(RESTIC_BIN_ENV).unwrap_or_else(|_| "restic".to_string())
}

/// Snapshot information, as printed by `restic snapshots --json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    pub time: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub paths: Vec<String>,
    /// restic leaves the key out for untagged snapshots
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Snapshot {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// One listing line: `<time> <id> <tags>`
    pub fn render(&self) -> String {
        let tags = self
            .tags
            .iter()
            .map(|t| format!("'{}'", t))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {} [{}]", self.time, self.id, tags)
    }
}

/// Render a listing, one snapshot per line
pub fn render_listing(snapshots: &[Snapshot]) -> String {
    snapshots
        .iter()
        .map(Snapshot::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the JSON output of `restic snapshots --json`
pub fn parse_snapshots(json: &str) -> Result<Vec<Snapshot>> {
    serde_json::from_str(json)
        .map_err(|e| Error::List(format!("failed to parse snapshots JSON: {}", e)))
}

/// Most recent snapshot that isn't a pre-restore safety archive
///
/// Snapshots are ordered by their RFC 3339 timestamp. If any timestamp fails
/// to parse the raw strings are compared instead. The sort is stable, so of
/// several snapshots with the same time the one listed last is chosen.
pub fn select_latest(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    let mut candidates: Vec<&Snapshot> = snapshots
        .iter()
        .filter(|s| !s.has_tag(SNAPSHOT_TAG))
        .collect();

    let times: Option<Vec<DateTime<FixedOffset>>> = candidates
        .iter()
        .map(|s| DateTime::parse_from_rfc3339(&s.time).ok())
        .collect();

    match times {
        Some(times) => {
            let mut keyed: Vec<_> = times.into_iter().zip(candidates).collect();
            keyed.sort_by_key(|(time, _)| *time);
            keyed.pop().map(|(_, snapshot)| snapshot)
        }
        None => {
            debug!("Unparseable snapshot time, ordering lexically");
            candidates.sort_by(|a, b| a.time.cmp(&b.time));
            candidates.pop()
        }
    }
}

/// Where restic puts `directory` when restoring into `target`
///
/// restic recreates the absolute path of the backed up directory below the
/// target, so `/srv/data` restored to `/srv/data.restic-restore` ends up in
/// `/srv/data.restic-restore/srv/data`.
pub fn restored_path(target: &Path, directory: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(directory).map_err(|e| Error::filesystem(directory, e))?;
    let relative: PathBuf = absolute
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();
    Ok(target.join(relative))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn list_args(config: &Config) -> Vec<String> {
    let mut args = vec!["snapshots".to_string(), "--json".to_string()];
    args.extend(config.flags(FlagContext::List).iter().cloned());
    args
}

/// An empty tag list adds no `--tag` option
pub fn backup_args(config: &Config, tags: &[&str]) -> Vec<String> {
    let mut args = vec!["backup".to_string()];
    if !tags.is_empty() {
        args.push("--tag".to_string());
        args.push(tags.join(","));
    }
    args.extend(config.flags(FlagContext::Backup).iter().cloned());
    args.push(path_arg(config.directory()));
    args
}

pub fn restore_args(config: &Config, target: &Path, snapshot_id: &str) -> Vec<String> {
    let mut args = vec![
        "restore".to_string(),
        "--target".to_string(),
        path_arg(target),
    ];
    args.extend(config.flags(FlagContext::Restore).iter().cloned());
    args.push(snapshot_id.to_string());
    args
}

pub fn check_args(config: &Config) -> Vec<String> {
    let mut args = vec![
        "check".to_string(),
        "--check-unused".to_string(),
        "--read-data".to_string(),
    ];
    args.extend(config.flags(FlagContext::Check).iter().cloned());
    args
}

pub fn unlock_args(config: &Config) -> Vec<String> {
    let mut args = vec!["unlock".to_string()];
    args.extend(config.flags(FlagContext::BreakLock).iter().cloned());
    args
}

fn run_restic(
    executor: &dyn CommandExecutor,
    config: &Config,
    args: Vec<String>,
    mode: OutputMode,
) -> Result<CommandOutput> {
    let env = config.environment();
    let spec = CommandSpec::new(restic_binary()).args(args).envs(env.vars());
    executor.run(&spec, mode)
}

/// List snapshots in the repository
pub fn list_snapshots(executor: &dyn CommandExecutor, config: &Config) -> Result<Vec<Snapshot>> {
    info!("Listing snapshots from repository...");

    let output = run_restic(executor, config, list_args(config), OutputMode::Capture)?;
    if !output.success {
        return Err(Error::List(format!(
            "restic exited with code {:?}",
            output.code
        )));
    }

    let snapshots = parse_snapshots(output.stdout.as_deref().unwrap_or_default())?;
    debug!("Found {} snapshots", snapshots.len());
    Ok(snapshots)
}

/// Back up the managed directory
pub fn backup(executor: &dyn CommandExecutor, config: &Config, tags: &[&str]) -> Result<()> {
    info!(
        "Creating archive of {} with tags {:?}",
        config.directory().display(),
        tags
    );

    let output = run_restic(executor, config, backup_args(config, tags), OutputMode::Stream)?;
    if !output.success {
        return Err(Error::Backup(output.code));
    }

    info!("Backup completed successfully");
    Ok(())
}

/// Restore one snapshot into `target`
pub fn restore_snapshot(
    executor: &dyn CommandExecutor,
    config: &Config,
    target: &Path,
    snapshot_id: &str,
) -> Result<()> {
    info!("Restoring snapshot {} to {}", snapshot_id, target.display());

    let args = restore_args(config, target, snapshot_id);
    let output = run_restic(executor, config, args, OutputMode::Stream)?;
    if !output.success {
        return Err(Error::Restore(output.code));
    }

    info!("Restore completed successfully");
    Ok(())
}

/// Check repository consistency, reading all pack data
pub fn check_repository(executor: &dyn CommandExecutor, config: &Config) -> Result<()> {
    info!("Checking repository integrity...");

    let output = run_restic(executor, config, check_args(config), OutputMode::Stream)?;
    if !output.success {
        return Err(Error::Check(output.code));
    }

    info!("Repository check passed");
    Ok(())
}

/// Remove stale locks from the repository
pub fn unlock_repository(executor: &dyn CommandExecutor, config: &Config) -> Result<()> {
    info!("Unlocking restic repository...");

    let output = run_restic(executor, config, unlock_args(config), OutputMode::Stream)?;
    if !output.success {
        return Err(Error::Unlock(output.code));
    }

    info!("Repository unlocked successfully");
    Ok(())
}
