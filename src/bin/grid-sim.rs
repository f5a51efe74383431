// Grid simulation CLI
// Replays price feeds through the grid engine and reports position and PnL

use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use grid_engine::{Config, ConfigError, FeedHeaders};

#[path = "../cli/replay_commands.rs"]
mod replay_commands;

#[derive(Parser)]
#[command(name = "grid-sim")]
#[command(version)]
#[command(about = "Grid trading strategy simulator", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "grid.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the grid levels and order sizes
    Levels,

    /// Show which grid level a price falls on
    Index {
        price: f64,
    },

    /// Replay a price feed through the engine
    Replay {
        /// Feed file: one price per line or `timestamp,price` rows
        feed: String,

        /// Emit a JSON report instead of log lines
        #[arg(long)]
        json: bool,

        /// Mark price for PnL (defaults to the last observed price)
        #[arg(short, long)]
        mark: Option<f64>,

        /// First row handling: auto, present or absent
        #[arg(long, default_value = "auto")]
        headers: FeedHeaders,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Config may be missing for `init`; logging falls back to info
    let loaded = Config::from_file(&cli.config);
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        loaded
            .as_ref()
            .ok()
            .and_then(|c| c.logging.level.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Commands::Init { force } = cli.command {
        return init_config(&cli.config, force);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuration Error");
            error!("{}", e);
            if matches!(e, ConfigError::FileNotFound(_)) {
                error!("💡 Run: grid-sim init --config {}", cli.config);
            }
            std::process::exit(1);
        }
    };

    let outcome = match cli.command {
        Commands::Levels => replay_commands::show_levels(&config),
        Commands::Index { price } => replay_commands::show_index(&config, price),
        Commands::Replay { feed, json, mark, headers } => {
            replay_commands::run_replay(&config, &feed, headers, json, mark)
        }
        Commands::Init { .. } => Ok(()),
    };

    if let Err(e) = outcome {
        error!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

fn init_config(path: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }

    let example = include_str!("../../config.toml.example");
    std::fs::write(path, example)?;
    info!("📝 Created {}", path);
    info!("💡 Next: grid-sim replay prices.csv --config {}", path);
    Ok(())
}
