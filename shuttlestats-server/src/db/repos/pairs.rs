//! Pair repository
//!
//! Handles pair CRUD with:
//! - Creation by player names inside one transaction
//! - Unordered uniqueness enforced by the `pairs_players_unordered` index
//! - Stats listing in a single JOIN query

use sqlx::{FromRow, PgConnection, PgPool};

use shuttlestats_core::names::display_name;
use shuttlestats_core::{Pairing, StatCounts, StatLine};

use super::players;
use super::stats::{CountsRow, STAT_COLUMNS};
use super::DbError;

/// Pair record joined with its player names
#[derive(Debug, Clone, FromRow)]
pub struct Pair {
    pub id: i32,
    pub player1_id: i32,
    pub player2_id: i32,
    pub player1: String,
    pub player2: String,
}

impl Pair {
    /// "PlayerA / PlayerB" in creation order
    pub fn display_name(&self) -> String {
        display_name(&self.player1, &self.player2)
    }
}

/// Pair with statistics over its matches
#[derive(Debug, Clone)]
pub struct PairStats {
    pub pair: Pair,
    pub stats: StatLine,
}

#[derive(FromRow)]
struct PairStatsRow {
    #[sqlx(flatten)]
    pair: Pair,
    #[sqlx(flatten)]
    counts: CountsRow,
}

/// Find the pair made of two players, in either order.
pub(crate) async fn id_by_players(
    conn: &mut PgConnection,
    player1_id: i32,
    player2_id: i32,
) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT id FROM pairs
        WHERE (player1_id = $1 AND player2_id = $2)
           OR (player1_id = $2 AND player2_id = $1)
        "#,
    )
    .bind(player1_id)
    .bind(player2_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|r| r.0))
}

/// Pair repository
pub struct PairRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PairRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a pair from two existing player names.
    ///
    /// Returns the new pair with zeroed stats.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either player name is unknown
    /// - `Conflict` if the two players already form a pair, in either order
    pub async fn create(&self, pairing: &Pairing) -> Result<PairStats, DbError> {
        let mut tx = self.pool.begin().await?;

        let mut ids = [0i32; 2];
        for (slot, name) in ids.iter_mut().zip([&pairing.first, &pairing.second]) {
            *slot = players::id_by_name(&mut *tx, name.as_str())
                .await?
                .ok_or_else(|| DbError::NotFound {
                    resource: "player",
                    id: name.as_str().to_owned(),
                })?;
        }
        let [player1_id, player2_id] = ids;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO pairs (player1_id, player2_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(player1_id)
        .bind(player2_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DbError::on_conflict(e, "pair", format!("'{}' already exists", pairing.display_name()))
        })?;

        tx.commit().await?;

        tracing::info!(pair_id = id, pair = %pairing.display_name(), "Pair created");

        Ok(PairStats {
            pair: Pair {
                id,
                player1_id,
                player2_id,
                player1: pairing.first.as_str().to_owned(),
                player2: pairing.second.as_str().to_owned(),
            },
            stats: StatLine::default(),
        })
    }

    /// List pairs by display name with stats over their matches.
    ///
    /// Pairs that have not played report zeros.
    pub async fn list_with_stats(&self) -> Result<Vec<PairStats>, DbError> {
        let sql = format!(
            r#"
            SELECT
                p.id,
                p.player1_id,
                p.player2_id,
                pl1.name AS player1,
                pl2.name AS player2,
                {STAT_COLUMNS}
            FROM pairs p
            JOIN players pl1 ON p.player1_id = pl1.id
            JOIN players pl2 ON p.player2_id = pl2.id
            LEFT JOIN matches m ON m.pair_id = p.id
            GROUP BY p.id, p.player1_id, p.player2_id, pl1.name, pl2.name
            ORDER BY pl1.name || ' / ' || pl2.name, p.id
            "#
        );

        let rows: Vec<PairStatsRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|r| PairStats {
                pair: r.pair,
                stats: StatLine::from(StatCounts::from(r.counts)),
            })
            .collect())
    }

    /// Delete a pair. Its matches stay, with a null pair reference.
    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let deleted = sqlx::query("DELETE FROM pairs WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::NotFound {
                resource: "pair",
                id: id.to_string(),
            });
        }

        tracing::info!(pair_id = id, "Pair deleted");
        Ok(())
    }
}
