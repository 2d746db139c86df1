//! Command implementations for the shuttlestats CLI

pub mod clear;
pub mod migrate;
pub mod seed;
pub mod serve;

use anyhow::{Context, Result};
use clap::Args;
use sqlx::PgPool;

pub use clear::run_clear;
pub use migrate::run_migrate;
pub use seed::run_seed;
pub use serve::run_serve;

/// Database connection arguments shared by every command
#[derive(Args, Debug)]
pub struct DbArgs {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled connections (a club sees a handful of clients at once)
    #[arg(long, env = "SHUTTLESTATS_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl DbArgs {
    pub async fn connect(&self) -> Result<PgPool> {
        shuttlestats_server::connect(&self.database_url, self.max_connections)
            .await
            .context("Failed to create database pool")
    }
}
