//! Player repository
//!
//! - create: plain INSERT, unique name violations become conflicts
//! - list: one LEFT JOIN query over every pair the player belongs to
//! - delete: pairs cascade, their matches keep a null pair reference

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use shuttlestats_core::{PlayerName, StatCounts, StatLine};

use super::stats::{CountsRow, STAT_COLUMNS};
use super::DbError;

/// Player record from database
#[derive(Debug, Clone, FromRow)]
pub struct Player {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Player with statistics over all matches of their pairs
#[derive(Debug, Clone)]
pub struct PlayerStats {
    pub id: i32,
    pub name: String,
    pub stats: StatLine,
}

#[derive(FromRow)]
struct PlayerStatsRow {
    id: i32,
    name: String,
    #[sqlx(flatten)]
    counts: CountsRow,
}

/// Look up a player id by exact name.
pub(crate) async fn id_by_name(
    conn: &mut PgConnection,
    name: &str,
) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM players WHERE name = $1")
        .bind(name)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Player repository
pub struct PlayerRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a player.
    ///
    /// # Errors
    ///
    /// `DbError::Conflict` when the name is already taken.
    pub async fn create(&self, name: &PlayerName) -> Result<Player, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO players (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_conflict(e, "player", format!("'{}' already exists", name.as_str())))
    }

    /// List players alphabetically with stats aggregated over every match
    /// played by any pair that includes them.
    pub async fn list_with_stats(&self) -> Result<Vec<PlayerStats>, DbError> {
        let sql = format!(
            r#"
            SELECT p.id, p.name, {STAT_COLUMNS}
            FROM players p
            LEFT JOIN pairs pr ON pr.player1_id = p.id OR pr.player2_id = p.id
            LEFT JOIN matches m ON m.pair_id = pr.id
            GROUP BY p.id, p.name
            ORDER BY p.name, p.id
            "#
        );

        let rows: Vec<PlayerStatsRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|r| PlayerStats {
                id: r.id,
                name: r.name,
                stats: StatLine::from(StatCounts::from(r.counts)),
            })
            .collect())
    }

    /// Delete a player. Their pairs go with them.
    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let deleted = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::NotFound {
                resource: "player",
                id: id.to_string(),
            });
        }

        tracing::info!(player_id = id, "Player deleted");
        Ok(())
    }
}
