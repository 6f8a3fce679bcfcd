//! # Delve Command Line
//!
//! Generates a dungeon layout from a level description and prints it.

use clap::{Parser, ValueEnum};
use delve::{DelveResult, DungeonGenerator, GenerationConfig, LevelDescription};
use log::{error, info};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Output formats for a generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One character per grid cell
    Ascii,
    /// Pretty-printed layout snapshot
    Json,
}

/// Command line arguments for the delve generator.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon layout generator")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level description JSON file (defaults to the built-in demo level)
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    format: OutputFormat,

    /// Probability of a secret room (0.0 to 1.0)
    #[arg(long)]
    secret_chance: Option<f64>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting delve v{}", delve::VERSION);

    if let Err(e) = run(&args).await {
        error!("Generation failed: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Initializes env_logger, honoring RUST_LOG when it is set.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_target(false)
        .init();
}

async fn run(args: &Args) -> DelveResult<()> {
    let level = match &args.level {
        Some(path) => {
            info!("Loading level description from {}", path.display());
            LevelDescription::load(path)?
        }
        None => LevelDescription::demo(),
    };

    let mut config = GenerationConfig::new(args.seed.unwrap_or(12345));
    if let Some(chance) = args.secret_chance {
        config = config.with_secret_room_chance(chance);
    }

    info!("Generating level '{}' with seed: {}", level.name, config.seed);

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let layout = DungeonGenerator::new()
        .generate_async(&level, &config, &cancel)
        .await?;

    match args.format {
        OutputFormat::Ascii => println!("{}", layout.ascii_map()),
        OutputFormat::Json => println!("{}", layout.snapshot().to_json()?),
    }

    Ok(())
}
