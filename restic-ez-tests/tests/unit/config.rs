//! Configuration resolution tests

use restic_ez::config::sources::{ConfigSource, EnvFile, EnvJson};
use restic_ez::config::{ConfigLoader, FlagContext};
use rstest::rstest;
use serial_test::serial;
use test_utils::{
    ConfigBuilder, Error, MockExecutor, MockPrompt, MockResponse, PromptCall, TestContext,
};

#[test]
fn test_secret_commands_run_through_shell() {
    let ctx = TestContext::new();
    let builder = ctx
        .config_builder()
        .restic_pass_command("pass show restic")
        .s3_pass_command("pass show s3");

    let executor = MockExecutor::new()
        .expect_args("sh", &["pass show restic"], MockResponse::stdout("restic-secret\n"))
        .expect_args("sh", &["pass show s3"], MockResponse::stdout("  s3-secret  "));
    let prompt = MockPrompt::new();

    let config = ConfigLoader::with_sources(ctx.sources(&builder), &executor, &prompt)
        .load()
        .unwrap();

    assert_eq!(config.restic().pass, "restic-secret");
    assert_eq!(config.s3().pass, "s3-secret");

    let calls = executor.get_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args, vec!["-c", "pass show restic"]);
    assert!(prompt.get_calls().is_empty());
}

#[test]
fn test_failing_secret_command() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder().s3_pass_command("false");

    let executor = MockExecutor::new().expect("sh", MockResponse::Failure { exit_code: 3 });
    let prompt = MockPrompt::new();

    let err = ConfigLoader::with_sources(ctx.sources(&builder), &executor, &prompt)
        .load()
        .unwrap_err();

    match err {
        Error::SecretCommand { section, field, code } => {
            assert_eq!(section, "s3");
            assert_eq!(field, "pass");
            assert_eq!(code, Some(3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_secrets_are_asked_once_each() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder().without_restic_pass().without_s3_pass();

    let executor = MockExecutor::new();
    let prompt = MockPrompt::new().with_input("typed-restic").with_input("typed-s3");

    let loader = ConfigLoader::with_sources(ctx.sources(&builder), &executor, &prompt);
    let config = loader.load().unwrap();

    assert_eq!(config.restic().pass, "typed-restic");
    assert_eq!(config.s3().pass, "typed-s3");
    assert_eq!(
        prompt.get_calls(),
        vec![
            PromptCall::Input {
                title: "Enter value for \"restic->pass\":".to_string()
            },
            PromptCall::Input {
                title: "Enter value for \"s3->pass\":".to_string()
            },
        ]
    );
    assert!(executor.get_calls().is_empty());
}

#[test]
fn test_cancelled_prompt_aborts_loading() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder().without_restic_pass();

    let executor = MockExecutor::new();
    let prompt = MockPrompt::new().with_cancelled_input();

    let err = ConfigLoader::with_sources(ctx.sources(&builder), &executor, &prompt)
        .load()
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_reloading_resolved_document_needs_no_prompt() {
    let ctx = TestContext::new();
    let builder = ctx.config_builder().without_s3_pass();

    let executor = MockExecutor::new();
    let prompt = MockPrompt::new().with_input("typed");
    let config = ConfigLoader::with_sources(ctx.sources(&builder), &executor, &prompt)
        .load()
        .unwrap();

    let quiet_prompt = MockPrompt::new();
    let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(
        restic_ez::config::sources::Embedded::new("reload", Some(config.to_json().as_str())),
    )];
    let reloaded = ConfigLoader::with_sources(sources, &executor, &quiet_prompt)
        .load()
        .unwrap();

    assert_eq!(reloaded.s3().pass, "typed");
    assert!(quiet_prompt.get_calls().is_empty());
}

#[test]
fn test_unknown_keys_survive_resolution() {
    let ctx = TestContext::new();
    let builder = ctx
        .config_builder()
        .extra("comment", serde_json::json!("kept"));

    let executor = MockExecutor::new();
    let prompt = MockPrompt::new();
    let config = ConfigLoader::with_sources(ctx.sources(&builder), &executor, &prompt)
        .load()
        .unwrap();

    assert_eq!(config.document()["comment"], "kept");
}

#[rstest]
#[case(FlagContext::Backup, "flags_backup")]
#[case(FlagContext::Restore, "flags_restore")]
#[case(FlagContext::Check, "flags_check")]
#[case(FlagContext::BreakLock, "flags_break_lock")]
#[case(FlagContext::List, "flags_list")]
fn test_flags_per_context(#[case] context: FlagContext, #[case] key: &str) {
    let config = ConfigBuilder::new()
        .flags(context, &["--verbose", "--limit-upload=100"])
        .build();

    assert_eq!(context.key(), key);
    assert_eq!(config.flags(context), ["--verbose", "--limit-upload=100"]);
    for other in FlagContext::ALL.into_iter().filter(|c| *c != context) {
        assert!(config.flags(other).is_empty());
    }
}

#[test]
fn test_malformed_json() {
    let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(
        restic_ez::config::sources::Embedded::new("broken", Some("{not json")),
    )];
    let err = ConfigLoader::with_sources(sources, &MockExecutor::new(), &MockPrompt::new())
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
}

#[test]
#[serial]
fn test_inline_json_wins_over_file() {
    let ctx = TestContext::new();
    let inline = ctx.config_builder().repo("inline-repo");
    let file = ctx.config_builder().repo("file-repo");
    let path = ctx.write_config(&file);

    std::env::set_var("RESTIC_EZ_UNIT_CONFIG", inline.to_json());
    std::env::set_var("RESTIC_EZ_UNIT_CONFIG_FILE", &path);

    let sources: Vec<Box<dyn ConfigSource>> = vec![
        Box::new(EnvJson::new("RESTIC_EZ_UNIT_CONFIG")),
        Box::new(EnvFile::new("RESTIC_EZ_UNIT_CONFIG_FILE")),
    ];
    let config = ConfigLoader::with_sources(sources, &MockExecutor::new(), &MockPrompt::new())
        .load()
        .unwrap();
    assert_eq!(config.restic().repo, "inline-repo");

    std::env::remove_var("RESTIC_EZ_UNIT_CONFIG");

    let sources: Vec<Box<dyn ConfigSource>> = vec![
        Box::new(EnvJson::new("RESTIC_EZ_UNIT_CONFIG")),
        Box::new(EnvFile::new("RESTIC_EZ_UNIT_CONFIG_FILE")),
    ];
    let config = ConfigLoader::with_sources(sources, &MockExecutor::new(), &MockPrompt::new())
        .load()
        .unwrap();
    assert_eq!(config.restic().repo, "file-repo");

    std::env::remove_var("RESTIC_EZ_UNIT_CONFIG_FILE");
}

#[test]
#[serial]
fn test_unreadable_config_file() {
    let ctx = TestContext::new();
    std::env::set_var(
        "RESTIC_EZ_UNIT_MISSING_FILE",
        ctx.temp_dir().join("does-not-exist.json"),
    );

    let sources: Vec<Box<dyn ConfigSource>> =
        vec![Box::new(EnvFile::new("RESTIC_EZ_UNIT_MISSING_FILE"))];
    let err = ConfigLoader::with_sources(sources, &MockExecutor::new(), &MockPrompt::new())
        .load()
        .unwrap_err();

    std::env::remove_var("RESTIC_EZ_UNIT_MISSING_FILE");
    assert!(matches!(err, Error::ConfigRead { .. }));
}

#[test]
fn test_no_source_lists_what_was_tried() {
    let sources: Vec<Box<dyn ConfigSource>> = vec![
        Box::new(EnvJson::new("RESTIC_EZ_UNIT_NEVER_SET")),
        Box::new(restic_ez::config::sources::Embedded::new("embedded CONFIG", None)),
    ];
    let err = ConfigLoader::with_sources(sources, &MockExecutor::new(), &MockPrompt::new())
        .load()
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("RESTIC_EZ_UNIT_NEVER_SET"));
    assert!(message.contains("embedded CONFIG"));
}
