//! Tests for the 'restore' command
//!
//! The restore workflow archives the current directory, asks before deleting
//! it, restores the latest regular archive next to it and moves it into place.

use restic_ez::managers::restore::{staging_path, RestoreStep, RestoreWorkflow};
use std::fs;
use test_utils::{
    archives_with_safety_snapshot, snapshot, Error, MockPrompt, MockResticOps, PromptCall,
    ResticCall, TestContext,
};

#[test]
fn test_restore_replaces_directory_contents() {
    let ctx = TestContext::new();
    let dir = ctx.populate_managed_dir(&[("old.txt", "old"), ("nested/keep.txt", "nested")]);

    let restic = MockResticOps::new()
        .with_snapshots(archives_with_safety_snapshot())
        .with_restore_payload(&dir, &[("restored.txt", "fresh"), ("sub/deep.txt", "deep")]);
    let prompt = MockPrompt::new().confirming();

    let mut workflow = RestoreWorkflow::new(&dir, &restic, &prompt);
    workflow.run().unwrap();

    assert_eq!(workflow.visited().last(), Some(&RestoreStep::Done));
    assert!(!dir.join("old.txt").exists());
    assert!(!dir.join("nested").exists());
    assert_eq!(fs::read_to_string(dir.join("restored.txt")).unwrap(), "fresh");
    assert_eq!(fs::read_to_string(dir.join("sub/deep.txt")).unwrap(), "deep");
    assert!(!staging_path(&dir).exists());
}

#[test]
fn test_restore_takes_snapshot_then_restores_latest_regular_archive() {
    let ctx = TestContext::new();
    let dir = ctx.populate_managed_dir(&[("a.txt", "a")]);

    let restic = MockResticOps::new()
        .with_snapshots(archives_with_safety_snapshot())
        .with_restore_payload(&dir, &[("a.txt", "restored")]);
    let prompt = MockPrompt::new().confirming();

    RestoreWorkflow::new(&dir, &restic, &prompt).run().unwrap();

    let calls = restic.get_calls();
    assert_eq!(
        calls[0],
        ResticCall::Create {
            tags: vec!["snapshot".to_string()]
        }
    );
    assert_eq!(calls[1], ResticCall::List);
    assert_eq!(
        calls[2],
        ResticCall::Restore {
            target: staging_path(&dir),
            snapshot_id: "regular2".to_string()
        }
    );
}

#[test]
fn test_declining_keeps_everything() {
    let ctx = TestContext::new();
    let dir = ctx.populate_managed_dir(&[("precious.txt", "keep me")]);

    let restic = MockResticOps::new().with_snapshots(archives_with_safety_snapshot());
    let prompt = MockPrompt::new();

    let err = RestoreWorkflow::new(&dir, &restic, &prompt)
        .run()
        .unwrap_err();

    assert!(matches!(err, Error::UserCancelled));
    assert_eq!(
        fs::read_to_string(dir.join("precious.txt")).unwrap(),
        "keep me"
    );
    assert!(!restic.restore_called());
    assert_eq!(
        prompt.get_calls()[1],
        PromptCall::Confirm {
            question: format!("Delete \"{}\"?", dir.display())
        }
    );
}

#[test]
fn test_restore_into_missing_directory() {
    let ctx = TestContext::new();
    let dir = ctx.managed_dir();

    let restic = MockResticOps::new()
        .with_snapshots(vec![snapshot("only", "2025-12-01T00:00:00Z", &["backup"])])
        .with_restore_payload(&dir, &[("file.txt", "content")]);
    let prompt = MockPrompt::new();

    let mut workflow = RestoreWorkflow::new(&dir, &restic, &prompt);
    workflow.run().unwrap();

    assert!(!workflow.visited().contains(&RestoreStep::SnapshotIfExists));
    assert!(!workflow.visited().contains(&RestoreStep::ConfirmDelete));
    assert!(restic.created_tags().is_empty());
    assert_eq!(restic.restored_id().as_deref(), Some("only"));
    assert!(dir.join("file.txt").exists());
}

#[test]
fn test_failed_restore_leaves_directory_deleted() {
    let ctx = TestContext::new();
    let dir = ctx.populate_managed_dir(&[("a.txt", "a")]);

    let restic = MockResticOps::new()
        .with_snapshots(archives_with_safety_snapshot())
        .with_failing_restore();
    let prompt = MockPrompt::new().confirming();

    let result = RestoreWorkflow::new(&dir, &restic, &prompt).run();

    assert!(matches!(result, Err(Error::Restore(_))));
    assert!(!dir.exists());
    // The safety archive holds the old contents
    assert_eq!(restic.created_tags(), vec![vec!["snapshot".to_string()]]);
}

#[test]
fn test_listing_failure_after_delete() {
    let ctx = TestContext::new();
    let dir = ctx.populate_managed_dir(&[("a.txt", "a")]);

    let restic = MockResticOps::new().with_failing_list();
    let prompt = MockPrompt::new().confirming();

    let mut workflow = RestoreWorkflow::new(&dir, &restic, &prompt);
    assert!(matches!(workflow.run(), Err(Error::List(_))));
    assert!(workflow.visited().contains(&RestoreStep::Deleted));
}
