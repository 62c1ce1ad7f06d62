use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use segscroll_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "segscroll")]
#[command(author, version, about = "Segmented scroll view with a collapsible header")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run {
        /// Number of demo segments
        #[arg(short = 'n', long, default_value_t = 4)]
        segments: usize,
    },
    /// Replay scripted child offsets and print where both surfaces end up
    Simulate {
        /// Collapse range of the header
        #[arg(short, long)]
        range: f64,
        /// Child offsets to assign in order, e.g. "-20,-30,10"
        #[arg(short, long, allow_hyphen_values = true)]
        steps: String,
        /// Initial parent offset
        #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
        parent: f64,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { segments }) => start_tui(segments),
        None => start_tui(4),
        Some(Commands::Simulate {
            range,
            steps,
            parent,
            json,
        }) => {
            // Headless replays don't depend on the config file
            init_logging(&AppConfig::default(), false)?;
            commands::simulate::run(range, &steps, parent, json)
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&load_config()?),
            // These must work even when the existing file does not parse
            ConfigAction::Path => commands::config::path(),
            ConfigAction::Init { force } => commands::config::init(force),
        },
    }
}

fn load_config() -> Result<AppConfig> {
    AppConfig::load().context("failed to load configuration")
}

fn start_tui(segments: usize) -> Result<()> {
    let config = Arc::new(load_config()?);
    // The TUI owns the terminal, so its logs go to a file
    init_logging(&config, true)?;
    commands::run::run(config, segments)
}

/// `RUST_LOG` wins over `general.log_level`
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        let path = config.log_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_needs_no_config_file() {
        let cli = Cli::try_parse_from([
            "segscroll",
            "simulate",
            "--range",
            "64",
            "--steps",
            "-20,-30",
            "--parent",
            "4",
        ])
        .unwrap();

        let Some(Commands::Simulate {
            range,
            steps,
            parent,
            json,
        }) = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!((range, steps.as_str(), parent, json), (64.0, "-20,-30", 4.0, false));
        assert!(commands::simulate::run(range, &steps, parent, json).is_ok());
    }

    #[test]
    fn test_run_is_the_default() {
        let cli = Cli::try_parse_from(["segscroll"]).unwrap();
        assert!(cli.command.is_none());
    }
}
