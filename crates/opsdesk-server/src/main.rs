mod api;
mod commands;
mod error;
mod lookup;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{contacts, lookup as lookup_cmd, serve, Context};
use crate::error::{exit_code_for, report_error};
use opsdesk_config as config;

#[derive(Debug, Parser)]
#[command(name = "opsdesk", version, about = "opsdesk customer lookup service")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve(serve::ServeArgs),
    /// Look up customers by the last four digits of their phone number
    Lookup(lookup_cmd::LookupArgs),
    /// Insert a contact into the primary store
    #[command(name = "add-contact")]
    AddContact(contacts::AddContactArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let default_level = match cli.command {
        Command::Serve(_) => "info",
        _ => "warn",
    };
    init_logging(verbose, default_level);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let db_path = db_path.or_else(|| app_config.store.path.clone());
    if verbose {
        match &db_path {
            Some(path) => debug!(path = %path.display(), "database path resolved"),
            None => debug!("no database path configured"),
        }
    }

    let ctx = Context {
        config: &app_config,
        db_path,
        json,
    };

    match command {
        Command::Serve(args) => serve::serve(&ctx, args),
        Command::Lookup(args) => lookup_cmd::lookup(&ctx, args),
        Command::AddContact(args) => contacts::add_contact(&ctx, args),
    }
}

fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { default_level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
