//! Match repository
//!
//! Handles match writes and reads with:
//! - Atomic creation of a match and its sets (transaction)
//! - Best-effort pairing resolution inside the same transaction
//! - Fixture grouping by date and opponent
//!
//! The aggregate columns on `matches` (result, sets and points) are a cache
//! of the `match_sets` rows. They are only ever written from a
//! [`MatchOutcome`] alongside the sets they summarize.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use shuttlestats_core::{MatchOutcome, MatchResult, OpponentName, Pairing, PlayedSet};

use super::{pairs, players, DbError};

/// Columns of a match joined with its pair's display name
const MATCH_SELECT: &str = r#"
    SELECT
        m.id,
        m.date,
        m.pair_id,
        pl1.name || ' / ' || pl2.name AS pairing,
        m.opponent,
        m.result,
        m.points_for,
        m.points_against,
        m.sets_for,
        m.sets_against,
        m.created_at
    FROM matches m
    LEFT JOIN pairs p ON p.id = m.pair_id
    LEFT JOIN players pl1 ON pl1.id = p.player1_id
    LEFT JOIN players pl2 ON pl2.id = p.player2_id
"#;

/// A validated match ready to be written
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub date: NaiveDate,
    /// "PlayerA / PlayerB"; unresolvable pairings are stored as no pair
    pub pairing: Option<String>,
    pub opponent: OpponentName,
    pub outcome: MatchOutcome,
}

/// Set record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SetRecord {
    pub match_id: i32,
    pub set_number: i32,
    pub points_for: i32,
    pub points_against: i32,
}

/// Match with its pairing name and sets
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub id: i32,
    pub date: NaiveDate,
    pub pair_id: Option<i32>,
    pub pairing: Option<String>,
    pub opponent: String,
    pub result: MatchResult,
    pub points_for: i32,
    pub points_against: i32,
    pub sets_for: i32,
    pub sets_against: i32,
    pub created_at: DateTime<Utc>,
    pub sets: Vec<SetRecord>,
}

/// All matches played on one date against one opponent
#[derive(Debug, Clone)]
pub struct MatchGroup {
    pub date: NaiveDate,
    pub opponent: String,
    pub match_ids: Vec<i32>,
    pub games_for: i64,
    pub games_against: i64,
    pub games_drawn: i64,
    pub sets_for: i64,
    pub sets_against: i64,
    pub points_for: i64,
    pub points_against: i64,
    pub sets: Vec<SetRecord>,
}

#[derive(FromRow)]
struct MatchRow {
    id: i32,
    date: NaiveDate,
    pair_id: Option<i32>,
    pairing: Option<String>,
    opponent: String,
    result: String,
    points_for: i32,
    points_against: i32,
    sets_for: i32,
    sets_against: i32,
    created_at: DateTime<Utc>,
}

impl MatchRow {
    fn into_record(self, sets: Vec<SetRecord>) -> Result<MatchRecord, DbError> {
        let result = self.result.parse::<MatchResult>().map_err(|e| DbError::Corrupt {
            table: "matches",
            reason: format!("match {}: {}", self.id, e),
        })?;

        Ok(MatchRecord {
            id: self.id,
            date: self.date,
            pair_id: self.pair_id,
            pairing: self.pairing,
            opponent: self.opponent,
            result,
            points_for: self.points_for,
            points_against: self.points_against,
            sets_for: self.sets_for,
            sets_against: self.sets_against,
            created_at: self.created_at,
            sets,
        })
    }
}

#[derive(FromRow)]
struct GroupRow {
    date: NaiveDate,
    opponent: String,
    match_ids: Vec<i32>,
    games_for: i64,
    games_against: i64,
    games_drawn: i64,
    sets_for: i64,
    sets_against: i64,
    points_for: i64,
    points_against: i64,
}

#[derive(FromRow)]
struct GroupSetRow {
    date: NaiveDate,
    opponent: String,
    #[sqlx(flatten)]
    set: SetRecord,
}

/// Resolve "PlayerA / PlayerB" to a pair id.
///
/// Any miss yields `None`; only database failures are errors.
async fn resolve_pair(
    conn: &mut PgConnection,
    pairing: Option<&str>,
) -> Result<Option<i32>, sqlx::Error> {
    let Some(raw) = pairing.filter(|p| !p.trim().is_empty()) else {
        return Ok(None);
    };

    let Some(pairing) = Pairing::parse(raw) else {
        tracing::debug!(pairing = raw, "Pairing not in 'PlayerA / PlayerB' form, storing without pair");
        return Ok(None);
    };

    let first = players::id_by_name(conn, pairing.first.as_str()).await?;
    let second = players::id_by_name(conn, pairing.second.as_str()).await?;
    let (Some(first), Some(second)) = (first, second) else {
        tracing::debug!(pairing = raw, "Pairing names an unknown player, storing without pair");
        return Ok(None);
    };

    let pair_id = pairs::id_by_players(conn, first, second).await?;
    if pair_id.is_none() {
        tracing::debug!(pairing = raw, "No pair for these players, storing without pair");
    }
    Ok(pair_id)
}

async fn insert_sets(
    conn: &mut PgConnection,
    match_id: i32,
    sets: &[PlayedSet],
) -> Result<(), sqlx::Error> {
    for set in sets {
        sqlx::query(
            r#"
            INSERT INTO match_sets (match_id, set_number, points_for, points_against)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(match_id)
        .bind(set.set_number)
        .bind(set.points_for)
        .bind(set.points_against)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Match repository
pub struct MatchRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MatchRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a match and its sets (atomic).
    ///
    /// Player lookups, pair lookup, the match insert and every set insert
    /// share one transaction. If any step fails the transaction is dropped
    /// uncommitted and nothing is written.
    pub async fn create(&self, new: &NewMatch) -> Result<MatchRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        let pair_id = resolve_pair(&mut tx, new.pairing.as_deref()).await?;
        let outcome = &new.outcome;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO matches
                (date, pair_id, opponent, result, points_for, points_against, sets_for, sets_against)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(new.date)
        .bind(pair_id)
        .bind(new.opponent.as_str())
        .bind(outcome.result.as_str())
        .bind(outcome.points_for)
        .bind(outcome.points_against)
        .bind(outcome.sets_for)
        .bind(outcome.sets_against)
        .fetch_one(&mut *tx)
        .await?;

        insert_sets(&mut tx, id, &outcome.sets).await?;

        tx.commit().await?;

        tracing::info!(
            match_id = id,
            ?pair_id,
            result = %outcome.result,
            sets = outcome.sets.len(),
            "Match created"
        );

        self.get(id).await
    }

    /// Replace a match's details and sets (atomic).
    ///
    /// Aggregates are recomputed from the new sets; the old sets are removed.
    pub async fn replace(&self, id: i32, new: &NewMatch) -> Result<MatchRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        let pair_id = resolve_pair(&mut tx, new.pairing.as_deref()).await?;
        let outcome = &new.outcome;

        let updated = sqlx::query(
            r#"
            UPDATE matches
            SET date = $2, pair_id = $3, opponent = $4, result = $5,
                points_for = $6, points_against = $7, sets_for = $8, sets_against = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new.date)
        .bind(pair_id)
        .bind(new.opponent.as_str())
        .bind(outcome.result.as_str())
        .bind(outcome.points_for)
        .bind(outcome.points_against)
        .bind(outcome.sets_for)
        .bind(outcome.sets_against)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(DbError::NotFound {
                resource: "match",
                id: id.to_string(),
            });
        }

        sqlx::query("DELETE FROM match_sets WHERE match_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_sets(&mut tx, id, &outcome.sets).await?;

        tx.commit().await?;

        tracing::info!(match_id = id, ?pair_id, result = %outcome.result, "Match replaced");

        self.get(id).await
    }

    /// Get a single match with its sets.
    pub async fn get(&self, id: i32) -> Result<MatchRecord, DbError> {
        let row: MatchRow = sqlx::query_as(&format!("{MATCH_SELECT} WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "match",
                id: id.to_string(),
            })?;

        let sets: Vec<SetRecord> = sqlx::query_as(
            r#"
            SELECT match_id, set_number, points_for, points_against
            FROM match_sets
            WHERE match_id = $1
            ORDER BY set_number
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        row.into_record(sets)
    }

    /// List every match, most recent first, each with its sets.
    ///
    /// Two queries total: matches, then all sets grouped in memory.
    pub async fn list(&self) -> Result<Vec<MatchRecord>, DbError> {
        let rows: Vec<MatchRow> =
            sqlx::query_as(&format!("{MATCH_SELECT} ORDER BY m.date DESC, m.id DESC"))
                .fetch_all(self.pool)
                .await?;

        let sets: Vec<SetRecord> = sqlx::query_as(
            r#"
            SELECT match_id, set_number, points_for, points_against
            FROM match_sets
            ORDER BY match_id, set_number
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let mut by_match: HashMap<i32, Vec<SetRecord>> = HashMap::new();
        for set in sets {
            by_match.entry(set.match_id).or_default().push(set);
        }

        rows.into_iter()
            .map(|row| {
                let sets = by_match.remove(&row.id).unwrap_or_default();
                row.into_record(sets)
            })
            .collect()
    }

    /// List fixtures: matches grouped by date and opponent, most recent first.
    pub async fn list_groups(&self) -> Result<Vec<MatchGroup>, DbError> {
        let groups: Vec<GroupRow> = sqlx::query_as(
            r#"
            SELECT
                date,
                opponent,
                ARRAY_AGG(id ORDER BY id) AS match_ids,
                COUNT(*) FILTER (WHERE sets_for > sets_against) AS games_for,
                COUNT(*) FILTER (WHERE sets_for < sets_against) AS games_against,
                COUNT(*) FILTER (WHERE sets_for = sets_against) AS games_drawn,
                COALESCE(SUM(sets_for), 0)::BIGINT AS sets_for,
                COALESCE(SUM(sets_against), 0)::BIGINT AS sets_against,
                COALESCE(SUM(points_for), 0)::BIGINT AS points_for,
                COALESCE(SUM(points_against), 0)::BIGINT AS points_against
            FROM matches
            GROUP BY date, opponent
            ORDER BY date DESC, opponent
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let set_rows: Vec<GroupSetRow> = sqlx::query_as(
            r#"
            SELECT m.date, m.opponent, s.match_id, s.set_number, s.points_for, s.points_against
            FROM match_sets s
            JOIN matches m ON m.id = s.match_id
            ORDER BY s.match_id, s.set_number
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let mut by_fixture: HashMap<(NaiveDate, String), Vec<SetRecord>> = HashMap::new();
        for row in set_rows {
            by_fixture
                .entry((row.date, row.opponent))
                .or_default()
                .push(row.set);
        }

        Ok(groups
            .into_iter()
            .map(|g| {
                let sets = by_fixture
                    .remove(&(g.date, g.opponent.clone()))
                    .unwrap_or_default();
                MatchGroup {
                    date: g.date,
                    opponent: g.opponent,
                    match_ids: g.match_ids,
                    games_for: g.games_for,
                    games_against: g.games_against,
                    games_drawn: g.games_drawn,
                    sets_for: g.sets_for,
                    sets_against: g.sets_against,
                    points_for: g.points_for,
                    points_against: g.points_against,
                    sets,
                }
            })
            .collect())
    }

    /// Delete a match. Its sets go with it.
    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let deleted = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::NotFound {
                resource: "match",
                id: id.to_string(),
            });
        }

        tracing::info!(match_id = id, "Match deleted");
        Ok(())
    }
}
