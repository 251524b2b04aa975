//! Restic operations abstraction for testability
//!
//! Workflows drive restic through [`ResticOperations`] so the restore sequence
//! can be exercised against [`mock::MockResticOps`].

use super::executor::CommandExecutor;
use crate::config::Config;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::info;

pub use super::restic::Snapshot;

/// Abstraction for restic operations, enabling mocking in tests
pub trait ResticOperations {
    /// List snapshots in the repository
    fn list(&self) -> Result<Vec<Snapshot>>;

    /// Back up the managed directory with the given tags
    fn create(&self, tags: &[&str]) -> Result<()>;

    /// Restore one specific snapshot into `target`
    fn restore_snapshot(&self, target: &Path, snapshot_id: &str) -> Result<()>;

    /// Check repository consistency
    fn check(&self) -> Result<()>;

    /// Remove stale repository locks
    fn break_lock(&self) -> Result<()>;

    /// Restore `snapshot_id`, or the latest regular archive when `None`
    ///
    /// Returns the id that was restored.
    fn restore(&self, target: &Path, snapshot_id: Option<&str>) -> Result<String> {
        let id = match snapshot_id {
            Some(id) => id.to_string(),
            None => {
                let snapshots = self.list()?;
                let latest = super::restic::select_latest(&snapshots).ok_or(Error::NoArchive)?;
                info!("Selected latest archive {} from {}", latest.id, latest.time);
                latest.id.clone()
            }
        };

        self.restore_snapshot(target, &id)?;
        Ok(id)
    }
}

/// Default implementation using real restic calls
pub struct RealResticOps<'a> {
    config: &'a Config,
    executor: &'a dyn CommandExecutor,
}

impl<'a> RealResticOps<'a> {
    pub fn new(config: &'a Config, executor: &'a dyn CommandExecutor) -> Self {
        Self { config, executor }
    }
}

impl ResticOperations for RealResticOps<'_> {
    fn list(&self) -> Result<Vec<Snapshot>> {
        super::restic::list_snapshots(self.executor, self.config)
    }

    fn create(&self, tags: &[&str]) -> Result<()> {
        super::restic::backup(self.executor, self.config, tags)
    }

    fn restore_snapshot(&self, target: &Path, snapshot_id: &str) -> Result<()> {
        super::restic::restore_snapshot(self.executor, self.config, target, snapshot_id)
    }

    fn check(&self) -> Result<()> {
        super::restic::check_repository(self.executor, self.config)
    }

    fn break_lock(&self) -> Result<()> {
        super::restic::unlock_repository(self.executor, self.config)
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use crate::utils::restic::restored_path;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Recorded operation call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ResticCall {
        List,
        Create { tags: Vec<String> },
        Restore { target: PathBuf, snapshot_id: String },
        Check,
        BreakLock,
    }

    /// Files written below the restore target, imitating restic
    #[derive(Clone, Debug, Default)]
    struct RestorePayload {
        directory: PathBuf,
        files: Vec<(String, String)>,
    }

    /// Mock restic operations for testing
    #[derive(Clone, Default)]
    pub struct MockResticOps {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<ResticCall>>>,
        /// Pre-configured snapshots to return
        pub snapshots: Arc<Mutex<Vec<Snapshot>>>,
        pub should_fail_create: Arc<Mutex<bool>>,
        pub should_fail_restore: Arc<Mutex<bool>>,
        pub should_fail_list: Arc<Mutex<bool>>,
        pub should_fail_check: Arc<Mutex<bool>>,
        pub should_fail_break_lock: Arc<Mutex<bool>>,
        payload: Arc<Mutex<Option<RestorePayload>>>,
    }

    impl MockResticOps {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure snapshots to return
        pub fn with_snapshots(self, snapshots: Vec<Snapshot>) -> Self {
            *self.snapshots.lock().unwrap() = snapshots;
            self
        }

        /// On restore, write `files` where restic would put `directory`
        pub fn with_restore_payload(self, directory: &Path, files: &[(&str, &str)]) -> Self {
            *self.payload.lock().unwrap() = Some(RestorePayload {
                directory: directory.to_path_buf(),
                files: files
                    .iter()
                    .map(|(name, content)| (name.to_string(), content.to_string()))
                    .collect(),
            });
            self
        }

        pub fn with_failing_create(self) -> Self {
            *self.should_fail_create.lock().unwrap() = true;
            self
        }

        pub fn with_failing_restore(self) -> Self {
            *self.should_fail_restore.lock().unwrap() = true;
            self
        }

        pub fn with_failing_list(self) -> Self {
            *self.should_fail_list.lock().unwrap() = true;
            self
        }

        pub fn with_failing_check(self) -> Self {
            *self.should_fail_check.lock().unwrap() = true;
            self
        }

        pub fn with_failing_break_lock(self) -> Self {
            *self.should_fail_break_lock.lock().unwrap() = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<ResticCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Tag lists of every create call
        pub fn created_tags(&self) -> Vec<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|c| match c {
                    ResticCall::Create { tags } => Some(tags.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Id of the last restored snapshot
        pub fn restored_id(&self) -> Option<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find_map(|c| match c {
                    ResticCall::Restore { snapshot_id, .. } => Some(snapshot_id.clone()),
                    _ => None,
                })
        }

        pub fn restore_called(&self) -> bool {
            self.restored_id().is_some()
        }

        fn record_call(&self, call: ResticCall) {
            self.calls.lock().unwrap().push(call);
        }

        fn write_payload(&self, target: &Path) -> Result<()> {
            let Some(payload) = self.payload.lock().unwrap().clone() else {
                return Ok(());
            };
            let base = restored_path(target, &payload.directory)?;
            for (name, content) in payload.files {
                let path = base.join(name);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, e))?;
                }
                std::fs::write(&path, content).map_err(|e| Error::filesystem(&path, e))?;
            }
            Ok(())
        }
    }

    impl ResticOperations for MockResticOps {
        fn list(&self) -> Result<Vec<Snapshot>> {
            self.record_call(ResticCall::List);
            if *self.should_fail_list.lock().unwrap() {
                return Err(Error::List("mock list failure".to_string()));
            }
            Ok(self.snapshots.lock().unwrap().clone())
        }

        fn create(&self, tags: &[&str]) -> Result<()> {
            self.record_call(ResticCall::Create {
                tags: tags.iter().map(|t| t.to_string()).collect(),
            });
            if *self.should_fail_create.lock().unwrap() {
                return Err(Error::Backup(Some(1)));
            }
            Ok(())
        }

        fn restore_snapshot(&self, target: &Path, snapshot_id: &str) -> Result<()> {
            self.record_call(ResticCall::Restore {
                target: target.to_path_buf(),
                snapshot_id: snapshot_id.to_string(),
            });
            if *self.should_fail_restore.lock().unwrap() {
                return Err(Error::Restore(Some(1)));
            }
            self.write_payload(target)
        }

        fn check(&self) -> Result<()> {
            self.record_call(ResticCall::Check);
            if *self.should_fail_check.lock().unwrap() {
                return Err(Error::Check(Some(1)));
            }
            Ok(())
        }

        fn break_lock(&self) -> Result<()> {
            self.record_call(ResticCall::BreakLock);
            if *self.should_fail_break_lock.lock().unwrap() {
                return Err(Error::Unlock(Some(1)));
            }
            Ok(())
        }
    }
}
