//! Trayecto CLI - Command-line interface for curriculum progress tracking.

use clap::Parser;
use std::path::PathBuf;
use trayecto_cli::commands::{self, SessionOptions};
use trayecto_cli::repl;
use trayecto_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        "warn,trayecto_cli=debug,trayecto_planner=debug,trayecto_sdk=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> trayecto_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load()?,
    };

    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let options = SessionOptions {
        student: cli.student,
        token: cli.token,
    };

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&mut config, &options, &formatter).await?;
        }
        Some(Command::Profile(args)) => {
            commands::execute_profile(args, &mut config, &formatter)?;
        }
        Some(command) => {
            let planner = commands::open_planner(&config, &options).await?;
            commands::execute_planner_command(command, &planner, &formatter).await?;
        }
    }

    Ok(())
}
