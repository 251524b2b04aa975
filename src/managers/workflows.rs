//! Command workflows
//!
//! Each workflow loads the configuration, so secrets are resolved (and asked
//! for) once per invocation, then drives restic through [`ResticOperations`].

use crate::config::sources::{default_sources, ConfigSource};
use crate::config::{Config, ConfigLoader};
use crate::error::{Error, Result};
use crate::managers::restore::RestoreWorkflow;
use crate::utils::executor::{CommandExecutor, CommandSpec, OutputMode};
use crate::utils::prompt::Prompt;
use crate::utils::restic::{render_listing, BACKUP_TAG};
use crate::utils::restic_ops::{RealResticOps, ResticOperations};
use tracing::info;

/// Program used to start the interactive shell
const SHELL_PROGRAM: &str = "/usr/bin/env";

pub struct Workflows<'a> {
    loader: ConfigLoader<'a>,
    executor: &'a dyn CommandExecutor,
    prompt: &'a dyn Prompt,
}

impl<'a> Workflows<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, prompt: &'a dyn Prompt) -> Self {
        Self::with_sources(default_sources(), executor, prompt)
    }

    /// Workflows reading the configuration from `sources`
    pub fn with_sources(
        sources: Vec<Box<dyn ConfigSource>>,
        executor: &'a dyn CommandExecutor,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            loader: ConfigLoader::with_sources(sources, executor, prompt),
            executor,
            prompt,
        }
    }

    fn load(&self) -> Result<Config> {
        self.loader.load()
    }

    /// Rendered archive listing, one archive per line
    pub fn list(&self) -> Result<String> {
        let config = self.load()?;
        self.prompt.info("Listing archives...")?;
        let snapshots = RealResticOps::new(&config, self.executor).list()?;
        Ok(render_listing(&snapshots))
    }

    pub fn create(&self) -> Result<()> {
        let config = self.load()?;
        self.prompt.info("Creating archive...")?;
        RealResticOps::new(&config, self.executor).create(&[BACKUP_TAG])
    }

    /// Replace the managed directory with the latest archive
    pub fn restore(&self) -> Result<()> {
        let config = self.load()?;
        let restic = RealResticOps::new(&config, self.executor);
        RestoreWorkflow::new(config.directory(), &restic, self.prompt).run()
    }

    pub fn check(&self) -> Result<()> {
        let config = self.load()?;
        self.prompt.info("Verifying archive...")?;
        RealResticOps::new(&config, self.executor).check()
    }

    pub fn break_lock(&self) -> Result<()> {
        let config = self.load()?;
        self.prompt.info("Breaking lock...")?;
        RealResticOps::new(&config, self.executor).break_lock()
    }

    /// Start tmux with the restic environment exported
    pub fn shell(&self) -> Result<()> {
        let config = self.load()?;
        let env = config.environment();
        info!("Starting tmux in {}", config.directory().display());

        let spec = CommandSpec::new(SHELL_PROGRAM)
            .arg("tmux")
            .envs(env.vars());
        let output = self.executor.run(&spec, OutputMode::Stream)?;
        if !output.success {
            return Err(Error::CommandFailed {
                program: "tmux".to_string(),
                code: output.code,
            });
        }
        Ok(())
    }
}
