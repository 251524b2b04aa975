//! Tests for the 'list' command

use restic_ez::managers::Workflows;
use test_utils::{
    archives_with_safety_snapshot, snapshots_json, Error, FlagContext, MockExecutor, MockPrompt,
    MockResponse, TestContext,
};

#[test]
fn test_list_prints_every_archive() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder();
    let executor = MockExecutor::new().expect(
        "restic",
        MockResponse::stdout(&snapshots_json(&archives_with_safety_snapshot())),
    );
    let prompt = MockPrompt::new();

    let listing = Workflows::with_sources(ctx.sources(&builder), &executor, &prompt)
        .list()
        .unwrap();

    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "2025-12-01T08:00:00Z regular1 ['backup']");
    assert_eq!(lines[2], "2025-12-03T08:00:00Z safety01 ['snapshot']");
}

#[test]
fn test_list_passes_flags_and_environment() {
    let ctx = TestContext::new();
    let builder = ctx
        .config_builder()
        .flags(FlagContext::List, &["--host", "nas"]);
    let executor = MockExecutor::new().expect("restic", MockResponse::stdout("[]"));
    let prompt = MockPrompt::new();

    let listing = Workflows::with_sources(ctx.sources(&builder), &executor, &prompt)
        .list()
        .unwrap();
    assert_eq!(listing, "");

    let calls = executor.get_calls();
    assert_eq!(calls[0].args, vec!["snapshots", "--json", "--host", "nas"]);
    assert_eq!(
        calls[0].env.get("RESTIC_REPOSITORY").map(String::as_str),
        Some("/tmp/restic-ez-test-repo")
    );
}

#[test]
fn test_list_restic_failure() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder();
    let executor = MockExecutor::new().expect("restic", MockResponse::Failure { exit_code: 1 });
    let prompt = MockPrompt::new();

    let result = Workflows::with_sources(ctx.sources(&builder), &executor, &prompt).list();
    assert!(matches!(result, Err(Error::List(_))));
}

#[test]
fn test_list_missing_restic_binary() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder();
    let executor = MockExecutor::new().expect("restic", MockResponse::NotFound);
    let prompt = MockPrompt::new();

    let result = Workflows::with_sources(ctx.sources(&builder), &executor, &prompt).list();
    assert!(matches!(result, Err(Error::Launch { .. })));
}
