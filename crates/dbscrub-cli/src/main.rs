//! dbscrub - anonymizes a collaboration platform database in place.
//!
//! One-shot batch tool: loads the settings, runs every anonymization unit
//! inside a single transaction, and reports progress per unit. Any failure
//! rolls the database back and exits non-zero.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use dbscrub_core::{Config, UnitProgress, run};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// dbscrub - platform database anonymizer
#[derive(Parser, Debug)]
#[command(name = "dbscrub")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the settings file (TOML); built-in defaults apply without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error:#}");
            return ExitCode::from(1);
        }
    };

    if let Some(home) = &config.platform.home {
        if !home.exists() {
            eprintln!(
                "the platform home directory isn't found at '{}'",
                home.display()
            );
            return ExitCode::from(2);
        }
        println!(
            "Platform home set at {}: both the database and the descriptor files will be anonymized",
            home.display()
        );
    } else {
        println!("Platform home not set: only the database will be anonymized");
    }

    match run(&config, print_progress) {
        Ok(summary) => {
            debug!(domains = summary.domains, users = summary.users, "run complete");
            ExitCode::SUCCESS
        }
        Err(error) => {
            // Completes the "Anonymizing the <unit>..." line of the unit
            // that failed.
            println!(" ERROR: {error}");
            ExitCode::from(1)
        }
    }
}

fn print_progress(progress: UnitProgress<'_>) {
    match progress {
        UnitProgress::Started(unit) => {
            print!("Anonymizing the {unit}...");
            let _ = std::io::stdout().flush();
        }
        UnitProgress::Completed(_, _) => println!(" DONE"),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            ensure!(
                path.exists(),
                "the settings file isn't found at '{}'",
                path.display()
            );
            Config::from_file(path)
                .with_context(|| format!("failed to load settings from '{}'", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}
