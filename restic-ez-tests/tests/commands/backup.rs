//! Tests for the 'backup' command (alias 'create')

use restic_ez::managers::Workflows;
use restic_ez::utils::executor::OutputMode;
use test_utils::{Error, MockExecutor, MockPrompt, MockResponse, TestContext};

#[test]
fn test_backup_tags_archive() {
    let ctx = TestContext::new();
    let dir = ctx.populate_managed_dir(&[("notes.txt", "hello")]);
    let builder = ctx.config_builder();
    let executor = MockExecutor::new();
    let prompt = MockPrompt::new();

    Workflows::with_sources(ctx.sources(&builder), &executor, &prompt)
        .create()
        .unwrap();

    let calls = executor.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args,
        vec![
            "backup".to_string(),
            "--tag".to_string(),
            "backup".to_string(),
            dir.display().to_string()
        ]
    );
    assert_eq!(calls[0].mode, OutputMode::Stream);
    assert_eq!(prompt.messages(), vec!["Creating archive..."]);
}

#[test]
fn test_backup_failure_reports_exit_code() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder();
    let executor = MockExecutor::new().expect("restic", MockResponse::Failure { exit_code: 3 });
    let prompt = MockPrompt::new();

    let err = Workflows::with_sources(ctx.sources(&builder), &executor, &prompt)
        .create()
        .unwrap_err();
    assert!(matches!(err, Error::Backup(Some(3))));
    assert_eq!(err.to_string(), "Backup failed with exit code Some(3)");
}

#[test]
fn test_backup_resolves_secret_before_running_restic() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder().restic_pass_command("cat ~/.restic-pass");
    let executor = MockExecutor::new().expect("sh", MockResponse::stdout("from-command\n"));
    let prompt = MockPrompt::new();

    Workflows::with_sources(ctx.sources(&builder), &executor, &prompt)
        .create()
        .unwrap();

    let calls = executor.get_calls();
    assert_eq!(calls[0].program, "sh");
    assert_eq!(calls[1].program, "restic");
    assert_eq!(
        calls[1].env.get("RESTIC_PASSWORD").map(String::as_str),
        Some("from-command")
    );
}
