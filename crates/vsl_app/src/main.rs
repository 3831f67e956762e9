mod app;
mod config;
mod effects;
mod logging;
mod terminal;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use vsl_core::QueryStatus;
use vsl_engine::EngineHandle;
use vsl_logging::{vsl_debug, vsl_info};

use crate::app::{AdminReply, App};
use crate::config::AppConfig;
use crate::effects::SystemClipboard;
use crate::logging::LogDestination;

/// Terminal client for browsing and ingesting VSL transcripts.
#[derive(Parser, Debug)]
#[command(name = "vsl", version, about)]
struct Cli {
    /// RON config file (defaults to ./vsl.ron when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides config and VSL_API_BASE
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File, global = true)]
    log: LogDestination,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive search, detail and admin pages (default)
    Browse,
    /// Run one search and print the results
    Search { term: String },
    /// Submit newline-separated URLs from a file, or stdin when omitted
    SubmitUrls { file: Option<PathBuf> },
    /// Ask the backend to ingest pending URLs now
    RunIngest {
        #[arg(long)]
        batch_size: Option<String>,
    },
    /// Print the effective configuration as RON
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    vsl_info!("Backend at {}", config.api_base);

    let command = cli.command.unwrap_or(Command::Browse);
    if let Command::Config = command {
        print!("{}", config.to_ron()?);
        return Ok(ExitCode::SUCCESS);
    }

    let engine = EngineHandle::new(config.api_settings(), config.download_dir.clone())
        .context("failed to start the backend client")?;
    let mut app = App::new(engine, Box::new(SystemClipboard), io::stdout());

    match command {
        Command::Browse => app.run_interactive()?,
        Command::Search { term } => {
            if app.search_once(&term)? == QueryStatus::Failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::SubmitUrls { file } => {
            let text = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    io::stdin()
                        .read_to_string(&mut text)
                        .context("failed to read URLs from stdin")?;
                    text
                }
            };
            return Ok(admin_exit_code(app.submit_urls_once(&text)?));
        }
        Command::RunIngest { batch_size } => {
            return Ok(admin_exit_code(app.run_ingest_once(batch_size.as_deref())?));
        }
        Command::Config => {}
    }
    Ok(ExitCode::SUCCESS)
}

fn admin_exit_code(reply: AdminReply) -> ExitCode {
    match reply {
        AdminReply::Answered(body) => {
            vsl_debug!("Admin reply: {}", body);
            ExitCode::SUCCESS
        }
        AdminReply::Failed(reason) => {
            eprintln!("{reason}");
            ExitCode::FAILURE
        }
    }
}
