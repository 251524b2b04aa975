//! Interactive prompts
//!
//! Workflows talk to the user through the [`Prompt`] trait. [`DialogPrompt`]
//! drives the `dialog` program, [`TerminalPrompt`] falls back to plain terminal
//! prompts when `dialog` isn't installed.

use super::executor::{CommandExecutor, CommandSpec, OutputMode, RealExecutor};
use crate::error::{Error, Result};
use tracing::{debug, warn};

/// Environment variable forcing a prompt backend (`dialog` or `terminal`)
pub const PROMPT_ENV: &str = "RESTIC_EZ_PROMPT";

/// Blocking user interaction primitives
pub trait Prompt {
    /// Ask a yes/no question, `true` means yes
    fn confirm(&self, question: &str, yes_label: &str, no_label: &str) -> Result<bool>;

    /// Ask for a line of text, `None` if the user cancelled
    fn input(&self, title: &str) -> Result<Option<String>>;

    /// Show a progress or status message without waiting for the user
    fn info(&self, message: &str) -> Result<()>;
}

/// Prompts rendered by the `dialog` program
pub struct DialogPrompt<E: CommandExecutor> {
    executor: E,
    program: String,
}

impl<E: CommandExecutor> DialogPrompt<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            program: "dialog".to_string(),
        }
    }

    fn base(&self) -> CommandSpec {
        CommandSpec::new(&self.program).arg("--stdout")
    }
}

impl<E: CommandExecutor> Prompt for DialogPrompt<E> {
    fn confirm(&self, question: &str, yes_label: &str, no_label: &str) -> Result<bool> {
        let spec = self
            .base()
            .arg("--clear")
            .args(["--yes-label", yes_label, "--no-label", no_label])
            .args(["--default-button", "no"])
            .args(["--yesno", question, "0", "0"]);

        // dialog exits 0 for the yes button, 1 for no and 255 for escape
        let output = self.executor.run(&spec, OutputMode::Capture)?;
        Ok(output.success)
    }

    fn input(&self, title: &str) -> Result<Option<String>> {
        let spec = self
            .base()
            .arg("--clear")
            .args(["--ok-label", "Ok", "--cancel-label", "Cancel"])
            .args(["--inputbox", title, "0", "0"]);

        let output = self.executor.run(&spec, OutputMode::Capture)?;
        if !output.success {
            debug!("Input dialog cancelled (exit code {:?})", output.code);
            return Ok(None);
        }
        Ok(Some(output.trimmed_stdout().to_string()))
    }

    fn info(&self, message: &str) -> Result<()> {
        let spec = self.base().args(["--infobox", message, "0", "0"]);

        let output = self.executor.run(&spec, OutputMode::Capture)?;
        if !output.success {
            return Err(Error::CommandFailed {
                program: self.program.clone(),
                code: output.code,
            });
        }
        Ok(())
    }
}

/// Prompts on the controlling terminal using `dialoguer`
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str, yes_label: &str, no_label: &str) -> Result<bool> {
        let answer = dialoguer::Confirm::new()
            .with_prompt(format!("{} [{} / {}]", question, yes_label, no_label))
            .default(false)
            .interact_opt()
            .map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(answer.unwrap_or(false))
    }

    fn input(&self, title: &str) -> Result<Option<String>> {
        let answer: String = dialoguer::Input::new()
            .with_prompt(title)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(Some(answer.trim().to_string()))
    }

    fn info(&self, message: &str) -> Result<()> {
        eprintln!("{}", message);
        Ok(())
    }
}

/// Pick the prompt backend for this process
///
/// `RESTIC_EZ_PROMPT` wins if set, otherwise `dialog` is used when it is on
/// `PATH`.
pub fn default_prompt() -> Box<dyn Prompt> {
    let forced = std::env::var(PROMPT_ENV).ok();
    let use_dialog = match forced.as_deref() {
        Some("dialog") => true,
        Some("terminal") => false,
        other => {
            if let Some(value) = other {
                warn!("Ignoring unknown {} value: {}", PROMPT_ENV, value);
            }
            which::which("dialog").is_ok()
        }
    };

    if use_dialog {
        debug!("Using dialog prompts");
        Box::new(DialogPrompt::new(RealExecutor::new()))
    } else {
        debug!("Using terminal prompts");
        Box::new(TerminalPrompt)
    }
}

/// Mock prompt for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Recorded prompt interaction
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PromptCall {
        Confirm { question: String },
        Input { title: String },
        Info { message: String },
    }

    /// Scripted prompt: answers come from pre-configured values
    #[derive(Clone, Default)]
    pub struct MockPrompt {
        pub calls: Arc<Mutex<Vec<PromptCall>>>,
        confirm_answer: Arc<Mutex<bool>>,
        /// Answers handed out in order; an exhausted queue means cancel
        inputs: Arc<Mutex<VecDeque<Option<String>>>>,
    }

    impl MockPrompt {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every confirmation with yes
        pub fn confirming(self) -> Self {
            *self.confirm_answer.lock().unwrap() = true;
            self
        }

        /// Queue a text answer
        pub fn with_input(self, value: &str) -> Self {
            self.inputs
                .lock()
                .unwrap()
                .push_back(Some(value.to_string()));
            self
        }

        /// Queue a cancelled input
        pub fn with_cancelled_input(self) -> Self {
            self.inputs.lock().unwrap().push_back(None);
            self
        }

        pub fn get_calls(&self) -> Vec<PromptCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn input_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, PromptCall::Input { .. }))
                .count()
        }

        pub fn confirm_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, PromptCall::Confirm { .. }))
                .count()
        }

        /// Messages shown through `info`, in order
        pub fn messages(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|c| match c {
                    PromptCall::Info { message } => Some(message.clone()),
                    _ => None,
                })
                .collect()
        }

        fn record_call(&self, call: PromptCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Prompt for MockPrompt {
        fn confirm(&self, question: &str, _yes_label: &str, _no_label: &str) -> Result<bool> {
            self.record_call(PromptCall::Confirm {
                question: question.to_string(),
            });
            Ok(*self.confirm_answer.lock().unwrap())
        }

        fn input(&self, title: &str) -> Result<Option<String>> {
            self.record_call(PromptCall::Input {
                title: title.to_string(),
            });
            Ok(self.inputs.lock().unwrap().pop_front().flatten())
        }

        fn info(&self, message: &str) -> Result<()> {
            self.record_call(PromptCall::Info {
                message: message.to_string(),
            });
            Ok(())
        }
    }
}
