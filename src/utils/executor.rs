//! Command execution abstraction for testability
//!
//! Every external program (restic, dialog, secret commands, tmux) is started
//! through a [`CommandExecutor`]. The real implementation spawns processes;
//! the mock records invocations and replays configured responses.

use crate::error::Result;
use std::collections::BTreeMap;

/// How the output of a command is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and return it as text
    Capture,
    /// Let the command write directly to the terminal
    Stream,
}

/// A program invocation: argument vector plus environment overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the ambient environment
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Program and arguments as a single line (environment values excluded)
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub success: bool,
    /// Captured stdout, only present in [`OutputMode::Capture`]
    pub stdout: Option<String>,
}

impl CommandOutput {
    /// Captured stdout with surrounding whitespace removed
    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Abstraction for command execution, enabling mocking in tests
///
/// A non-zero exit is not an error at this level: callers inspect
/// [`CommandOutput::success`] and map failures onto their own error variant.
/// Only a failure to start the program is returned as `Err`.
pub trait CommandExecutor: Send + Sync {
    fn run(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
        super::command::run_command(command, mode)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub env: BTreeMap<String, String>,
        pub mode: OutputMode,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String },
        Failure { exit_code: i32 },
        /// The program could not be started at all
        NotFound,
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
            }
        }
    }

    impl MockResponse {
        pub fn stdout(stdout: &str) -> Self {
            MockResponse::Success {
                stdout: stdout.to_string(),
            }
        }
    }

    #[derive(Clone, Debug)]
    struct Expectation {
        program: String,
        /// Every listed argument must appear in the call
        with_args: Vec<String>,
        response: MockResponse,
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses, first match wins
        expectations: Arc<Mutex<Vec<Expectation>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific program
        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            self.expect_args(program, &[], response)
        }

        /// Configure a response for calls of `program` that contain all of `args`
        pub fn expect_args(self, program: &str, args: &[&str], response: MockResponse) -> Self {
            self.expectations.lock().unwrap().push(Expectation {
                program: program.to_string(),
                with_args: args.iter().map(|s| s.to_string()).collect(),
                response,
            });
            self
        }

        /// Set the default response for unconfigured programs
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.program == program)
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        fn record_call(&self, command: &CommandSpec, mode: OutputMode) {
            self.calls.lock().unwrap().push(CommandCall {
                program: command.program.clone(),
                args: command.args.clone(),
                env: command.env.clone(),
                mode,
            });
        }

        fn get_response(&self, command: &CommandSpec) -> MockResponse {
            self.expectations
                .lock()
                .unwrap()
                .iter()
                .find(|e| {
                    e.program == command.program
                        && e.with_args.iter().all(|a| command.args.contains(a))
                })
                .map(|e| e.response.clone())
                .unwrap_or_else(|| self.default_response.lock().unwrap().clone())
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
            self.record_call(command, mode);
            let captured = |stdout: String| match mode {
                OutputMode::Capture => Some(stdout),
                OutputMode::Stream => None,
            };

            match self.get_response(command) {
                MockResponse::Success { stdout } => Ok(CommandOutput {
                    code: Some(0),
                    success: true,
                    stdout: captured(stdout),
                }),
                MockResponse::Failure { exit_code } => Ok(CommandOutput {
                    code: Some(exit_code),
                    success: false,
                    stdout: captured(String::new()),
                }),
                MockResponse::NotFound => Err(Error::Launch {
                    program: command.program.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }
}
