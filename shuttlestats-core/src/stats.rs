//! Aggregated statistics
//!
//! Counts come from the database; every percentage is derived here so the
//! same counts always give the same figures.

use serde::Serialize;

/// Decimal places kept on every percentage.
const PERCENT_SCALE: f64 = 10_000.0;

/// `numerator / denominator` rounded to 4 decimal places, or 0 when the
/// denominator is not positive.
///
/// ```
/// assert_eq!(shuttlestats_core::ratio(2, 3), 0.6667);
/// assert_eq!(shuttlestats_core::ratio(5, 0), 0.0);
/// ```
pub fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * PERCENT_SCALE).round() / PERCENT_SCALE
}

/// Raw counts for one pair or player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatCounts {
    pub games_played: i64,
    pub games_for: i64,
    pub games_against: i64,
    pub sets_won: i64,
    pub sets_lost: i64,
    pub points_for: i64,
    pub points_against: i64,
}

/// Stat row shared by the pair and player listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatLine {
    pub games_played: i64,
    pub games_for: i64,
    pub games_against: i64,
    pub game_win_percent: f64,
    pub sets_won: i64,
    pub sets_lost: i64,
    pub set_win_percent: f64,
    pub points_for: i64,
    pub points_against: i64,
}

impl From<StatCounts> for StatLine {
    fn from(c: StatCounts) -> Self {
        Self {
            games_played: c.games_played,
            games_for: c.games_for,
            games_against: c.games_against,
            game_win_percent: ratio(c.games_for, c.games_played),
            sets_won: c.sets_won,
            sets_lost: c.sets_lost,
            set_win_percent: ratio(c.sets_won, c.sets_won + c.sets_lost),
            points_for: c.points_for,
            points_against: c.points_against,
        }
    }
}

/// Raw counts across every match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamCounts {
    pub total_matches: i64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub sets_for: i64,
    pub sets_against: i64,
    pub points_for: i64,
    pub points_against: i64,
}

/// Team-wide totals, independent of pairing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamTotals {
    pub total_matches: i64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub win_percent: f64,
    pub sets_for: i64,
    pub sets_against: i64,
    pub points_for: i64,
    pub points_against: i64,
}

impl From<TeamCounts> for TeamTotals {
    fn from(c: TeamCounts) -> Self {
        Self {
            total_matches: c.total_matches,
            wins: c.wins,
            losses: c.losses,
            draws: c.draws,
            win_percent: ratio(c.wins, c.total_matches),
            sets_for: c.sets_for,
            sets_against: c.sets_against,
            points_for: c.points_for,
            points_against: c.points_against,
        }
    }
}
