//! Seed command: bulk-load a club's data from JSON
//!
//! ```json
//! {
//!   "players": ["Alice", "Bob"],
//!   "pairs": [{"player1": "Alice", "player2": "Bob"}],
//!   "matches": [{
//!     "date": "2024-03-09",
//!     "pairing": "Alice / Bob",
//!     "opponent": "Riverside",
//!     "sets": [{"pointsFor": 21, "pointsAgainst": 15}]
//!   }]
//! }
//! ```
//!
//! The whole file is validated before anything is written. Players and pairs
//! that already exist are skipped; matches are always added.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use sqlx::PgPool;

use shuttlestats_core::{Pairing, PlayerName};
use shuttlestats_server::db::{MatchRepo, NewMatch, PairRepo, PlayerRepo};
use shuttlestats_server::http::routes::matches::MatchRequest;
use shuttlestats_server::migrations;

use super::DbArgs;

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Seed file (JSON with players, pairs and matches)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    pairs: Vec<SeedPair>,
    #[serde(default)]
    matches: Vec<MatchRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedPair {
    player1: String,
    player2: String,
}

/// Validated seed contents
#[derive(Debug)]
pub struct SeedPlan {
    pub players: Vec<PlayerName>,
    pub pairs: Vec<Pairing>,
    pub matches: Vec<NewMatch>,
}

/// Rows written by a seed run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub players_created: usize,
    pub players_skipped: usize,
    pub pairs_created: usize,
    pub pairs_skipped: usize,
    pub matches_created: usize,
}

/// Read and validate a seed file.
pub fn load_seed(path: &Path) -> Result<SeedPlan> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let file: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid seed file {}", path.display()))?;

    let players = file
        .players
        .iter()
        .enumerate()
        .map(|(i, name)| PlayerName::new(name).with_context(|| format!("players[{}]", i)))
        .collect::<Result<Vec<_>>>()?;

    let pairs = file
        .pairs
        .iter()
        .enumerate()
        .map(|(i, p)| Pairing::new(&p.player1, &p.player2).with_context(|| format!("pairs[{}]", i)))
        .collect::<Result<Vec<_>>>()?;

    let matches = file
        .matches
        .into_iter()
        .enumerate()
        .map(|(i, m)| m.validate().with_context(|| format!("matches[{}]", i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(SeedPlan {
        players,
        pairs,
        matches,
    })
}

/// Write a validated plan, skipping players and pairs that already exist.
pub async fn apply_seed(pool: &PgPool, plan: &SeedPlan) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let players = PlayerRepo::new(pool);
    for name in &plan.players {
        match players.create(name).await {
            Ok(_) => report.players_created += 1,
            Err(e) if e.is_conflict() => {
                tracing::debug!(player = name.as_str(), "Player exists, skipping");
                report.players_skipped += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create player {}", name.as_str()))
            }
        }
    }

    let pairs = PairRepo::new(pool);
    for pairing in &plan.pairs {
        match pairs.create(pairing).await {
            Ok(_) => report.pairs_created += 1,
            Err(e) if e.is_conflict() => {
                tracing::debug!(pair = %pairing.display_name(), "Pair exists, skipping");
                report.pairs_skipped += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create pair {}", pairing.display_name()))
            }
        }
    }

    let matches = MatchRepo::new(pool);
    for (i, new) in plan.matches.iter().enumerate() {
        matches
            .create(new)
            .await
            .with_context(|| format!("Failed to create matches[{}]", i))?;
        report.matches_created += 1;
    }

    Ok(report)
}

/// Load a seed file into the database
pub async fn run_seed(args: SeedArgs) -> Result<()> {
    let plan = load_seed(&args.file)?;
    tracing::info!(
        players = plan.players.len(),
        pairs = plan.pairs.len(),
        matches = plan.matches.len(),
        "Seed file validated"
    );

    let pool = args.db.connect().await?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let report = apply_seed(&pool, &plan).await?;

    println!(
        "Players: {} created, {} skipped",
        report.players_created, report.players_skipped
    );
    println!(
        "Pairs: {} created, {} skipped",
        report.pairs_created, report.pairs_skipped
    );
    println!("Matches: {} created", report.matches_created);
    Ok(())
}
