use super::sources::{default_sources, ConfigSource};
use super::types::Config;
use crate::error::{Error, Result};
use crate::utils::command::shell_command;
use crate::utils::executor::{CommandExecutor, OutputMode};
use crate::utils::prompt::Prompt;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Secret fields resolved after parsing, in resolution order
pub const SECRET_FIELDS: [(&str, &str); 2] = [("restic", "pass"), ("s3", "pass")];

/// Loads a configuration and resolves its secrets
///
/// Secret commands run through the executor, missing secrets are asked for
/// through the prompt.
pub struct ConfigLoader<'a> {
    sources: Vec<Box<dyn ConfigSource>>,
    executor: &'a dyn CommandExecutor,
    prompt: &'a dyn Prompt,
}

impl<'a> ConfigLoader<'a> {
    /// Loader using the standard sources
    pub fn new(executor: &'a dyn CommandExecutor, prompt: &'a dyn Prompt) -> Self {
        Self::with_sources(default_sources(), executor, prompt)
    }

    pub fn with_sources(
        sources: Vec<Box<dyn ConfigSource>>,
        executor: &'a dyn CommandExecutor,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            sources,
            executor,
            prompt,
        }
    }

    /// Locate, parse and resolve the configuration
    pub fn load(&self) -> Result<Config> {
        let (source, raw) = self.read_raw()?;
        info!("Loading configuration from {}", source);

        let document: Value = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigParse(format!("{}: {}", source, e)))?;

        let resolved = resolve_document(document, self.executor, self.prompt)?;
        Config::from_document(resolved)
    }

    /// First source that holds a document
    fn read_raw(&self) -> Result<(String, String)> {
        for source in &self.sources {
            if let Some(raw) = source.fetch()? {
                return Ok((source.name(), raw));
            }
            debug!("Configuration source {} not set", source.name());
        }

        Err(Error::ConfigSource {
            tried: self
                .sources
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Load the configuration from the standard sources
pub fn load_config(executor: &dyn CommandExecutor, prompt: &dyn Prompt) -> Result<Config> {
    ConfigLoader::new(executor, prompt).load()
}

/// Fill in every secret field of a raw document
///
/// Returns the resolved document; the input is consumed so the raw form can't
/// be used by accident afterwards.
pub fn resolve_document(
    mut document: Value,
    executor: &dyn CommandExecutor,
    prompt: &dyn Prompt,
) -> Result<Value> {
    for (section, field) in SECRET_FIELDS {
        let table = section_mut(&mut document, section)?;
        eval_field(table, section, field, executor, prompt)?;
    }
    Ok(document)
}

fn section_mut<'v>(document: &'v mut Value, section: &str) -> Result<&'v mut Map<String, Value>> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| Error::ConfigParse("configuration must be a JSON object".to_string()))?;

    root.get_mut(section)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::ConfigParse(format!("missing \"{}\" section", section)))
}

/// Resolve one dynamic field
///
/// A literal value is kept as is. Otherwise `<field>_command` is run through
/// the shell and its trimmed output becomes the value, and without a command
/// the user is asked.
fn eval_field(
    table: &mut Map<String, Value>,
    section: &str,
    field: &str,
    executor: &dyn CommandExecutor,
    prompt: &dyn Prompt,
) -> Result<()> {
    if table.contains_key(field) {
        return Ok(());
    }

    let command_key = format!("{}_command", field);
    let value = match table.get(&command_key) {
        Some(Value::String(command)) => {
            debug!("Evaluating {}.{} from {}", section, field, command_key);
            let output = executor.run(&shell_command(command), OutputMode::Capture)?;
            if !output.success {
                return Err(Error::SecretCommand {
                    section: section.to_string(),
                    field: field.to_string(),
                    code: output.code,
                });
            }
            output.trimmed_stdout().to_string()
        }
        Some(_) => {
            return Err(Error::ConfigParse(format!(
                "{}.{} must be a string",
                section, command_key
            )));
        }
        None => {
            let title = format!("Enter value for \"{}->{}\":", section, field);
            prompt.input(&title)?.ok_or(Error::UserCancelled)?
        }
    };

    table.insert(field.to_string(), Value::String(value));
    Ok(())
}
