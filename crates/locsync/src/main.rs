//! `locsync` command line: `sync` and `flush` workflows.

use anyhow::Context;
use clap::{Parser, Subcommand};
use locsync::logging::init_logging;
use locsync::{run_flush, run_sync};
use locsync_config::{ConfigLoadOptions, ConfigProfile, SyncConfig};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command-line options.
#[derive(Parser)]
#[command(
    name = "locsync",
    version,
    about = "Synchronize ServiceNow locations into an Infoblox extensible attribute"
)]
struct Cli {
    /// Path to config.yaml (defaults to the executable's directory, then the cwd)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the attribute's allowed values with the ServiceNow location names
    Sync,
    /// Reset the attribute's allowed values to the CLEARED placeholder
    Flush {
        /// Confirm the destructive reset
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    fn profile(&self) -> ConfigProfile {
        match self {
            Command::Sync => ConfigProfile::Sync,
            Command::Flush { .. } => ConfigProfile::Flush,
        }
    }

    fn log_file(&self) -> &'static str {
        match self {
            Command::Sync => "locsync-sync.log",
            Command::Flush { .. } => "locsync-flush.log",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Flush { yes: false } = cli.command {
        eprintln!("error: flush resets every allowed value of the attribute; rerun with --yes");
        return ExitCode::FAILURE;
    }

    // Logging settings come from the config, so load errors go to stderr.
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging, cli.command.log_file());

    match run(&cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    let profile = cli.command.profile();
    let options = match cli.config.as_ref() {
        Some(path) => ConfigLoadOptions::new(path, profile),
        None => ConfigLoadOptions::discover(profile),
    }
    .with_env();
    SyncConfig::load(&options)
        .with_context(|| format!("failed to load config from {}", options.path.display()))
}

async fn run(command: &Command, config: &SyncConfig) -> anyhow::Result<()> {
    match command {
        Command::Sync => {
            let report = run_sync(config).await?;
            if report.changed() {
                println!(
                    "EA '{}' updated with {} values",
                    report.attribute,
                    report.desired.len()
                );
            } else {
                println!("EA '{}' already up to date", report.attribute);
            }
        }
        Command::Flush { .. } => {
            let report = run_flush(config).await?;
            info!("flush of '{}' via {} done", report.attribute, report.reference);
            println!(
                "EA '{}' flushed ({} previous values replaced by {:?})",
                report.attribute, report.previous_count, report.submitted
            );
        }
    }
    Ok(())
}
