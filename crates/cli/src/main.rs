// gamelist - update game list catalogs from reference and supplemental data

mod exit_codes;
mod merge;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use gamelist_config::Settings;
use gamelist_recon::ReconError;

#[derive(Parser)]
#[command(name = "gamelist")]
#[command(about = "Update game list catalogs from reference and supplemental data")]
#[command(version)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update a catalog and write <stem>_upd.xml next to it
    #[command(after_help = "\
Examples:
  gamelist merge mame_039_0.33b3.xml --data extra.txt --all
  gamelist merge mame_039_0.33b3.xml --data extra.txt --reference full.xml --select mameID,add_in
  gamelist merge mame_039_0.33b3.xml --data extra.txt --selection driver-only.toml --on-duplicate first --json")]
    Merge(merge::MergeArgs),

    /// Inspect persisted settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file path
    Path,
    /// Print the effective settings as JSON
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Merge(args) => merge::cmd_merge(args),
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                println!("{}", Settings::config_path().display());
                Ok(())
            }
            ConfigCommands::Show => cmd_config_show(),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_config_show() -> Result<(), CliError> {
    let settings = Settings::load();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the registry exit code.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Io(_) => Some(format!(
                "relative paths are also looked up in the folders.* entries of {}",
                Settings::config_path().display()
            )),
            ReconError::InvalidDecision { .. } => {
                Some("answer with one of the listed numbers".to_string())
            }
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }
}
