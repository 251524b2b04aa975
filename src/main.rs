use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use restic_ez::managers::logging::{init_logging, LoggingConfig};
use restic_ez::managers::Workflows;
use restic_ez::utils::executor::RealExecutor;
use restic_ez::utils::prompt::default_prompt;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "restic-ez")]
#[command(about = "Back up, restore and inspect one directory with restic", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Arguments after the command name, accepted and ignored
#[derive(Args, Debug, Clone, Default)]
struct Ignored {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    _rest: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print this help
    Help(Ignored),

    /// List archives in the repository
    List(Ignored),

    /// Archive the managed directory
    #[command(visible_alias = "create")]
    Backup(Ignored),

    /// Replace the managed directory with the latest archive
    Restore(Ignored),

    /// Verify repository integrity, reading all data
    #[command(visible_alias = "verify")]
    Check(Ignored),

    /// Remove stale repository locks
    BreakLock(Ignored),

    /// Open tmux with the restic environment exported
    #[command(visible_alias = "shell")]
    Tmux(Ignored),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Help(_) => "help",
            Commands::List(_) => "list",
            Commands::Backup(_) => "backup",
            Commands::Restore(_) => "restore",
            Commands::Check(_) => "check",
            Commands::BreakLock(_) => "break-lock",
            Commands::Tmux(_) => "tmux",
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => return usage(ExitCode::FAILURE),
    };

    match cli.command {
        None => usage(ExitCode::FAILURE),
        Some(command) => match run(&command) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn print_usage() -> std::io::Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

fn usage(code: ExitCode) -> ExitCode {
    if let Err(e) = print_usage() {
        eprintln!("Error: {}", e);
    }
    code
}

fn run(command: &Commands) -> Result<()> {
    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&LoggingConfig::from_env())?;
    debug!("Running {}", command.name());

    let executor = RealExecutor::new();
    let prompt = default_prompt();
    let workflows = Workflows::new(&executor, &*prompt);

    let result = dispatch(&workflows, command);
    if let Err(e) = &result {
        debug!("{} failed: {:#}", command.name(), e);
    }
    result
}

fn dispatch(workflows: &Workflows, command: &Commands) -> Result<()> {
    match command {
        Commands::List(_) => {
            let listing = workflows.list()?;
            println!("{}", listing);
        }
        Commands::Backup(_) => workflows.create()?,
        Commands::Restore(_) => workflows.restore()?,
        Commands::Check(_) => workflows.check()?,
        Commands::BreakLock(_) => workflows.break_lock()?,
        Commands::Tmux(_) => workflows.shell()?,
        Commands::Help(_) => print_usage()?,
    }

    Ok(())
}
