pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use custsync_core::config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "custsync",
    about = "Customer reconciliation CLI",
    long_about = "Reconcile external customer records against the internal customer store: \
                  apply migrations, sync a record, and inspect configuration.",
    after_help = "Examples:\n  custsync migrate\n  custsync sync --file customer.json\n  custsync config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Reconcile one external customer record against the configured database")]
    Sync {
        #[arg(long, help = "Path to a JSON file holding one external customer record")]
        file: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Sync { file } => commands::sync::run(&file),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Install the global subscriber per the logging config. A second call is a
/// no-op, which keeps repeated in-process command invocations safe.
pub(crate) fn init_logging(config: &AppConfig) {
    use custsync_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let result = match config.logging.format {
        Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .compact()
            .try_init(),
        Pretty => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .pretty()
            .try_init(),
        Json => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .json()
            .try_init(),
    };
    let _ = result;
}
