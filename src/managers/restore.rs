//! Restore workflow
//!
//! Replaces the managed directory with the latest regular archive:
//!
//! ```text
//! Start -> SnapshotIfExists -> ConfirmDelete -> Deleted -> Restored -> Relocated -> Done
//!   |                               |
//!   | directory absent              | declined
//!   +------> Restored               +------> Cancelled
//! ```
//!
//! The current state of the directory is archived under the `snapshot` tag
//! before anything is deleted. restic restores into a staging tree next to the
//! directory, which is then moved into place.
//!
//! A failure after `Deleted` leaves the directory missing and the staging tree
//! possibly populated. The `snapshot` archive taken before the deletion still
//! holds the old contents.

use crate::error::{Error, Result};
use crate::utils::prompt::Prompt;
use crate::utils::restic::{restored_path, SNAPSHOT_TAG};
use crate::utils::restic_ops::ResticOperations;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Appended to the directory path to form the staging path
pub const STAGING_SUFFIX: &str = ".restic-restore";

/// States of the restore workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStep {
    Start,
    SnapshotIfExists,
    ConfirmDelete,
    Deleted,
    Restored,
    Relocated,
    Done,
    Cancelled,
}

/// Restore target used before the result is moved into place
pub fn staging_path(directory: &Path) -> PathBuf {
    // Collecting the components drops any trailing separator
    let normalized: PathBuf = directory.components().collect();
    let mut staging: OsString = normalized.into_os_string();
    staging.push(STAGING_SUFFIX);
    PathBuf::from(staging)
}

pub struct RestoreWorkflow<'a> {
    directory: PathBuf,
    restic: &'a dyn ResticOperations,
    prompt: &'a dyn Prompt,
    visited: Vec<RestoreStep>,
}

impl<'a> RestoreWorkflow<'a> {
    pub fn new(
        directory: &Path,
        restic: &'a dyn ResticOperations,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            directory: directory.to_path_buf(),
            restic,
            prompt,
            visited: Vec::new(),
        }
    }

    /// States entered so far, in order
    pub fn visited(&self) -> &[RestoreStep] {
        &self.visited
    }

    /// Run the workflow to completion or to the first failure
    pub fn run(&mut self) -> Result<()> {
        let mut step = RestoreStep::Start;
        loop {
            debug!("Restore step: {:?}", step);
            self.visited.push(step);

            step = match step {
                RestoreStep::Start => self.start(),
                RestoreStep::SnapshotIfExists => self.snapshot()?,
                RestoreStep::ConfirmDelete => self.confirm_delete()?,
                RestoreStep::Deleted => self.delete()?,
                RestoreStep::Restored => self.restore()?,
                RestoreStep::Relocated => self.relocate()?,
                RestoreStep::Done => {
                    info!("Restored {}", self.directory.display());
                    return Ok(());
                }
                RestoreStep::Cancelled => {
                    info!("Restore cancelled, {} left untouched", self.directory.display());
                    return Err(Error::UserCancelled);
                }
            };
        }
    }

    fn start(&self) -> RestoreStep {
        if self.directory.exists() {
            RestoreStep::SnapshotIfExists
        } else {
            info!(
                "{} does not exist, restoring without snapshot",
                self.directory.display()
            );
            RestoreStep::Restored
        }
    }

    fn snapshot(&self) -> Result<RestoreStep> {
        self.prompt.info("Creating snapshot archive...")?;
        self.restic.create(&[SNAPSHOT_TAG])?;
        Ok(RestoreStep::ConfirmDelete)
    }

    fn confirm_delete(&self) -> Result<RestoreStep> {
        let question = format!("Delete \"{}\"?", self.directory.display());
        if self.prompt.confirm(&question, "Delete directory", "Cancel")? {
            Ok(RestoreStep::Deleted)
        } else {
            Ok(RestoreStep::Cancelled)
        }
    }

    fn delete(&self) -> Result<RestoreStep> {
        info!("Deleting {}", self.directory.display());
        fs::remove_dir_all(&self.directory).map_err(|e| Error::filesystem(&self.directory, e))?;
        Ok(RestoreStep::Restored)
    }

    fn restore(&self) -> Result<RestoreStep> {
        let staging = staging_path(&self.directory);
        if staging.exists() {
            warn!("Removing stale staging tree {}", staging.display());
            fs::remove_dir_all(&staging).map_err(|e| Error::filesystem(&staging, e))?;
        }

        self.prompt
            .info("Restoring latest archive (this may take some time)...")?;
        let id = self.restic.restore(&staging, None)?;
        debug!("Archive {} restored to {}", id, staging.display());
        Ok(RestoreStep::Relocated)
    }

    fn relocate(&self) -> Result<RestoreStep> {
        self.prompt
            .info("Moving restored directory into final location...")?;

        let staging = staging_path(&self.directory);
        let restored = restored_path(&staging, &self.directory)?;
        if !restored.exists() {
            return Err(Error::filesystem(
                &restored,
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "restored directory missing from staging tree",
                ),
            ));
        }

        fs::rename(&restored, &self.directory).map_err(|e| Error::filesystem(&restored, e))?;
        fs::remove_dir_all(&staging).map_err(|e| Error::filesystem(&staging, e))?;
        Ok(RestoreStep::Done)
    }
}
