//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, loads configuration and
//! credentials, and starts the interactive shell or one of the small
//! configuration subcommands.

pub mod init;
pub mod scenario_list;

use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::init::write_starter_config;
use crate::cli::scenario_list::list_scenarios;
use crate::core::chat_stream::OpenAiClient;
use crate::core::config::{path_display, Config, ConfigError};
use crate::core::credentials;
use crate::core::scenario::Scenario;
use crate::core::session::Session;
use crate::ui::prompts::{pick_scenario, TerminalInput};
use crate::ui::shell::{Shell, ShellOptions};
use crate::utils::logging::TranscriptLog;

#[derive(Parser)]
#[command(name = "rpchat")]
#[command(version)]
#[command(about = "A role-play chat shell for OpenAI-compatible APIs")]
#[command(
    long_about = "rpchat runs a line-oriented role-play session against an OpenAI-compatible \
chat completion API. A scenario sets the narrator's personality, the world and how dungeon \
rooms are described; you talk to the narrator with 'say' and move between rooms with 'new'.\n\n\
Environment Variables (fallback if not set in the config file):\n\
  OPENAI_API_KEY    Your API key\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  RPCHAT_LOG        Diagnostic log filter (optional, defaults to warn)\n\n\
Shell commands:\n\
  new dungeon|room  Start a new room, optionally with extra detail\n\
  say <text>        Say something to the narrator\n\
  continue          Ask for a reply to the last thing you said\n\
  undo              Drop the last exchange\n\
  retry             Regenerate the last reply\n\
  show context      Print the messages sent to the model\n\
  copy              Copy the last reply to the clipboard\n\
  help, quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file to use instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model to use for this run
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Reply length limit for this run (0 leaves it to the API)
    #[arg(long, global = true, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Append a transcript of the session to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the role-play shell (default)
    Talk {
        /// Scenario to play; pick one interactively when omitted
        scenario: Option<String>,
    },
    /// List configured scenarios
    Scenarios,
    /// Show the configuration file location and its settings
    Config,
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

/// Per-run options for the shell that come from the command line.
#[derive(Debug, Default)]
pub struct TalkOptions {
    pub scenario: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub log: Option<PathBuf>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    crate::logging::init();
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let Args {
        command,
        config,
        model,
        max_tokens,
        log,
    } = Args::parse();

    let config_path = match config {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    match command.unwrap_or(Commands::Talk { scenario: None }) {
        Commands::Init { force } => {
            match write_starter_config(&config_path, force) {
                Ok(()) => println!(
                    "✅ Wrote starter configuration to {}",
                    path_display(&config_path)
                ),
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Config => {
            for line in config_report(&config_path) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Scenarios => {
            let config = load_config_or_exit(&config_path);
            list_scenarios(&config.catalog(), &mut io::stdout())?;
            Ok(())
        }
        Commands::Talk { scenario } => {
            let options = TalkOptions {
                scenario,
                model,
                max_tokens,
                log,
            };
            run_talk(&config_path, options).await
        }
    }
}

fn load_config_or_exit(config_path: &Path) -> Config {
    match Config::load_from_path(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    }
}

/// Lines printed by `rpchat config`.
pub fn config_report(config_path: &Path) -> Vec<String> {
    let mut lines = vec![format!("Config file: {}", path_display(config_path))];
    match Config::load_from_path(config_path) {
        Ok(config) => lines.extend(config.summary_lines()),
        Err(ConfigError::NotFound { .. }) => {
            lines.push("No configuration file yet. Run `rpchat init` to create one.".to_string())
        }
        Err(e) => lines.push(format!("❌ {e}")),
    }
    lines
}

async fn run_talk(config_path: &Path, options: TalkOptions) -> Result<(), Box<dyn Error>> {
    let config = load_config_or_exit(config_path);

    let credentials = match credentials::resolve(&config) {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            eprintln!("Quick fixes:");
            for fix in e.quick_fixes() {
                eprintln!("  {fix}");
            }
            std::process::exit(e.exit_code());
        }
    };

    let catalog = config.catalog();
    if catalog.is_empty() {
        eprintln!(
            "❌ No scenarios configured in {}. Add a [[scenarios]] entry or run `rpchat init`.",
            path_display(config_path)
        );
        std::process::exit(1);
    }

    let transcript = TranscriptLog::new(options.log);
    if let Err(e) = transcript.check_access() {
        if let Some(path) = transcript.path() {
            eprintln!("❌ Cannot open log file {}: {e}", path_display(path));
        }
        std::process::exit(1);
    }
    if let Some(path) = transcript.path() {
        println!("📝 Logging to {}", path_display(path));
    }

    let mut input = TerminalInput;
    let scenario: Scenario = match options.scenario {
        Some(name) => match catalog.get(&name) {
            Ok(scenario) => scenario.clone(),
            Err(e) => {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
        },
        None => match pick_scenario(&catalog, &mut input, &mut io::stdout())? {
            Some(scenario) => scenario,
            None => return Ok(()),
        },
    };

    let settings = config.session_settings(options.model.as_deref(), options.max_tokens);
    debug!(
        base_url = %credentials.base_url,
        model = %settings.model,
        scenario = %scenario.name,
        "starting session"
    );

    let timeout = Duration::from_secs(config.session.request_timeout_secs.max(1));
    let client = OpenAiClient::new(credentials.base_url, credentials.api_key, timeout)?;
    let shell_options = ShellOptions {
        confirm_say: config.session.confirm_say,
        clipboard_chunk_size: config.clipboard.chunk_size(),
        interrupt_on_ctrl_c: true,
    };

    let session = Session::new(scenario, settings);
    let mut shell = Shell::new(session, &client, shell_options, transcript, io::stdout());
    shell.run(&mut input).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
