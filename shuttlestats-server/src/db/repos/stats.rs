//! Aggregate statistics
//!
//! All counts are computed by SQL at read time; percentages are left to
//! `shuttlestats_core::stats` so they are a pure function of the counts.

use sqlx::{FromRow, PgPool};

use shuttlestats_core::{StatCounts, TeamCounts, TeamTotals};

use super::DbError;

/// Stat columns over a LEFT JOINed `matches m`.
///
/// Rows without a match contribute nothing, so an unplayed pair or player
/// gets zeros rather than being dropped.
pub(crate) const STAT_COLUMNS: &str = r#"
    COUNT(m.id) AS games_played,
    COUNT(m.id) FILTER (WHERE m.sets_for > m.sets_against) AS games_for,
    COUNT(m.id) FILTER (WHERE m.sets_for < m.sets_against) AS games_against,
    COALESCE(SUM(m.sets_for), 0)::BIGINT AS sets_won,
    COALESCE(SUM(m.sets_against), 0)::BIGINT AS sets_lost,
    COALESCE(SUM(m.points_for), 0)::BIGINT AS points_for,
    COALESCE(SUM(m.points_against), 0)::BIGINT AS points_against
"#;

/// Row shape of [`STAT_COLUMNS`]
#[derive(Debug, Clone, Copy, FromRow)]
pub(crate) struct CountsRow {
    pub games_played: i64,
    pub games_for: i64,
    pub games_against: i64,
    pub sets_won: i64,
    pub sets_lost: i64,
    pub points_for: i64,
    pub points_against: i64,
}

impl From<CountsRow> for StatCounts {
    fn from(r: CountsRow) -> Self {
        Self {
            games_played: r.games_played,
            games_for: r.games_for,
            games_against: r.games_against,
            sets_won: r.sets_won,
            sets_lost: r.sets_lost,
            points_for: r.points_for,
            points_against: r.points_against,
        }
    }
}

#[derive(Debug, FromRow)]
struct TeamRow {
    total_matches: i64,
    wins: i64,
    losses: i64,
    draws: i64,
    sets_for: i64,
    sets_against: i64,
    points_for: i64,
    points_against: i64,
}

/// Team-wide statistics
pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Totals across every match, independent of pairing.
    pub async fn team_totals(&self) -> Result<TeamTotals, DbError> {
        let row: TeamRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_matches,
                COUNT(*) FILTER (WHERE sets_for > sets_against) AS wins,
                COUNT(*) FILTER (WHERE sets_for < sets_against) AS losses,
                COUNT(*) FILTER (WHERE sets_for = sets_against) AS draws,
                COALESCE(SUM(sets_for), 0)::BIGINT AS sets_for,
                COALESCE(SUM(sets_against), 0)::BIGINT AS sets_against,
                COALESCE(SUM(points_for), 0)::BIGINT AS points_for,
                COALESCE(SUM(points_against), 0)::BIGINT AS points_against
            FROM matches
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(TeamTotals::from(TeamCounts {
            total_matches: row.total_matches,
            wins: row.wins,
            losses: row.losses,
            draws: row.draws,
            sets_for: row.sets_for,
            sets_against: row.sets_against,
            points_for: row.points_for,
            points_against: row.points_against,
        }))
    }
}
