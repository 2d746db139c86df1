//! Schema migrations and data reset
//!
//! Every statement is idempotent so `run` is safe on each startup.

use sqlx::PgPool;

/// Schema statements, applied in order
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pairs (
        id SERIAL PRIMARY KEY,
        player1_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        player2_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (player1_id <> player2_id)
    )
    "#,
    // A pair is the same pair whichever order its players were given in
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS pairs_players_unordered
        ON pairs (LEAST(player1_id, player2_id), GREATEST(player1_id, player2_id))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        id SERIAL PRIMARY KEY,
        date DATE NOT NULL,
        pair_id INTEGER REFERENCES pairs(id) ON DELETE SET NULL,
        opponent VARCHAR(255) NOT NULL,
        result VARCHAR(1) NOT NULL CHECK (result IN ('W', 'L', 'D')),
        points_for INTEGER NOT NULL DEFAULT 0,
        points_against INTEGER NOT NULL DEFAULT 0,
        sets_for INTEGER NOT NULL DEFAULT 0,
        sets_against INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS match_sets (
        id SERIAL PRIMARY KEY,
        match_id INTEGER NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
        set_number INTEGER NOT NULL CHECK (set_number >= 1 AND set_number <= 3),
        points_for INTEGER NOT NULL DEFAULT 0 CHECK (points_for >= 0),
        points_against INTEGER NOT NULL DEFAULT 0 CHECK (points_against >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (match_id, set_number)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS matches_pair_id ON matches (pair_id)",
    "CREATE INDEX IF NOT EXISTS matches_date ON matches (date DESC)",
];

/// Create all tables and indexes.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = SCHEMA.len(), "Schema migrations complete");
    Ok(())
}

/// Rows removed by [`clear`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedRows {
    pub matches: u64,
    pub pairs: u64,
    pub players: u64,
}

/// Delete every match, pair and player in one transaction.
///
/// Sets go with their matches through the cascade.
pub async fn clear(pool: &PgPool) -> Result<ClearedRows, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Children first so nothing depends on a row being removed
    let matches = sqlx::query("DELETE FROM matches")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let pairs = sqlx::query("DELETE FROM pairs")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let players = sqlx::query("DELETE FROM players")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    let cleared = ClearedRows {
        matches,
        pairs,
        players,
    };
    tracing::info!(?cleared, "Database cleared");
    Ok(cleared)
}
