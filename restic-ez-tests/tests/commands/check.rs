//! Tests for the 'check' command (alias 'verify')

use restic_ez::managers::Workflows;
use test_utils::{Error, FlagContext, MockExecutor, MockPrompt, MockResponse, TestContext};

#[test]
fn test_check_reads_all_data() {
    let ctx = TestContext::new();
    let builder = ctx
        .config_builder()
        .flags(FlagContext::Check, &["--read-data-subset=10%"]);
    let executor = MockExecutor::new();
    let prompt = MockPrompt::new();

    Workflows::with_sources(ctx.sources(&builder), &executor, &prompt)
        .check()
        .unwrap();

    assert_eq!(
        executor.get_calls()[0].args,
        vec!["check", "--check-unused", "--read-data", "--read-data-subset=10%"]
    );
    assert_eq!(prompt.messages(), vec!["Verifying archive..."]);
}

#[test]
fn test_check_failure() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder();
    let executor = MockExecutor::new().expect("restic", MockResponse::Failure { exit_code: 1 });
    let prompt = MockPrompt::new();

    let result = Workflows::with_sources(ctx.sources(&builder), &executor, &prompt).check();
    assert!(matches!(result, Err(Error::Check(Some(1)))));
}
