//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use shuttlestats_server::migrations;

use super::DbArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

/// Create any missing tables and indexes. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let pool = args.db.connect().await?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;

    println!("Schema up to date");
    Ok(())
}
