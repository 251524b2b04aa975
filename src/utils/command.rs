//! Process execution on top of `std::process`

use super::executor::{CommandOutput, CommandSpec, OutputMode};
use crate::error::{Error, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Run a command in the given mode
///
/// The environment of `spec` is overlaid on the ambient environment of this
/// process. In capture mode only stdout is piped; stdin and stderr stay attached
/// to the terminal so interactive programs (dialog, restic password prompts)
/// keep working.
pub fn run_command(spec: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.envs(&spec.env);
    cmd.stdin(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    debug!("Running command ({:?}): {}", mode, spec.display());

    let launch_error = |source| Error::Launch {
        program: spec.program.clone(),
        source,
    };

    let output = match mode {
        OutputMode::Capture => {
            cmd.stdout(Stdio::piped());
            let output = cmd.output().map_err(launch_error)?;
            CommandOutput {
                code: output.status.code(),
                success: output.status.success(),
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            }
        }
        OutputMode::Stream => {
            cmd.stdout(Stdio::inherit());
            let status = cmd.status().map_err(launch_error)?;
            CommandOutput {
                code: status.code(),
                success: status.success(),
                stdout: None,
            }
        }
    };

    if !output.success {
        // Not always an error: dialog reports "no" through its exit code
        debug!(
            "Command exited with code {:?}: {}",
            output.code, spec.program
        );
    }

    Ok(output)
}

/// Build a command that runs `script` through the platform shell
pub fn shell_command(script: &str) -> CommandSpec {
    #[cfg(unix)]
    let (shell, flag) = ("sh", "-c");

    #[cfg(windows)]
    let (shell, flag) = ("cmd", "/C");

    CommandSpec::new(shell).arg(flag).arg(script)
}
