//! Data wipe command

use anyhow::{bail, Context, Result};
use clap::Parser;

use shuttlestats_server::migrations;

use super::DbArgs;

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Confirm deleting every match, pair and player
    #[arg(long)]
    pub yes: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Delete all data, leaving the schema in place.
pub async fn run_clear(args: ClearArgs) -> Result<()> {
    if !args.yes {
        bail!("Refusing to delete all data without --yes");
    }

    let pool = args.db.connect().await?;
    let cleared = migrations::clear(&pool)
        .await
        .context("Failed to clear data")?;

    tracing::info!(
        matches = cleared.matches,
        pairs = cleared.pairs,
        players = cleared.players,
        "Data cleared"
    );
    println!(
        "Deleted {} matches, {} pairs, {} players",
        cleared.matches, cleared.pairs, cleared.players
    );
    Ok(())
}
