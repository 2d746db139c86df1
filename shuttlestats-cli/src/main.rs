//! shuttlestats CLI - badminton club stats backend
//!
//! Entry point for the `shuttlestats` binary:
//! - `serve`: run the HTTP API (applies migrations first)
//! - `migrate`: create or update the database schema
//! - `seed`: load players, pairs and matches from a JSON file
//! - `clear`: delete every match, pair and player

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "shuttlestats",
    author,
    version,
    about = "Badminton club statistics: players, pairs, matches and set scores",
    long_about = "Records doubles matches from raw set scores and serves win/loss/points \
                  statistics per player, per pair and for the team over a JSON API."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces to an OTLP endpoint (needs the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Load players, pairs and matches from a JSON seed file
    Seed(commands::seed::SeedArgs),
    /// Delete every match, pair and player
    Clear(commands::clear::ClearArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values already in the environment win over .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::Seed(args) => commands::run_seed(args).await,
        Commands::Clear(args) => commands::run_clear(args).await,
    };

    tracing_setup::shutdown_otel();
    result
}
