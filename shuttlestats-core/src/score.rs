//! Set scores and match result derivation
//!
//! Per-set scores are the source of truth. A match's set tally, point
//! totals and result are always recomputed from them here and never
//! accepted from callers.
//!
//! Rules:
//! - A 0-0 set was not played and is dropped before anything else
//! - A set is won by the side with more points; an equal nonzero score
//!   counts toward neither tally
//! - The match result compares sets won against sets lost

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationError;

/// Maximum number of sets in one match (best of three)
pub const MAX_SETS: usize = 3;

/// Highest score accepted for one side of a set (regulation sets end by 30)
pub const MAX_SET_POINTS: i64 = 99;

const NOT_AN_INTEGER: &str = "must be a non-negative integer";

/// Overall result of a match, stored and serialized as a single letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "D")]
    Draw,
}

impl MatchResult {
    /// Compare sets won against sets lost.
    pub fn from_sets(sets_for: i32, sets_against: i32) -> Self {
        match sets_for.cmp(&sets_against) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Less => Self::Loss,
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "W",
            Self::Loss => "L",
            Self::Draw => "D",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchResult {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "W" => Ok(Self::Win),
            "L" => Ok(Self::Loss),
            "D" => Ok(Self::Draw),
            _ => Err(ValidationError::InvalidFormat {
                field: "result",
                reason: "must be one of W, L, D",
            }),
        }
    }
}

/// Score of a single set as entered, before 0-0 sets are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScore {
    points_for: i32,
    points_against: i32,
}

impl SetScore {
    /// Create a set score from already-typed points.
    ///
    /// `set` is the 1-based position used in error messages.
    pub fn new(set: usize, points_for: i64, points_against: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            points_for: checked_points(set, "pointsFor", points_for)?,
            points_against: checked_points(set, "pointsAgainst", points_against)?,
        })
    }

    /// Create a set score from raw JSON values.
    ///
    /// Only JSON integers are accepted; strings, floats, booleans and
    /// missing values are rejected with the offending field named.
    pub fn from_json(
        set: usize,
        points_for: Option<&Value>,
        points_against: Option<&Value>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            points_for: json_points(set, "pointsFor", points_for)?,
            points_against: json_points(set, "pointsAgainst", points_against)?,
        })
    }

    pub fn points_for(&self) -> i32 {
        self.points_for
    }

    pub fn points_against(&self) -> i32 {
        self.points_against
    }

    /// A 0-0 set was left blank and is not persisted.
    pub fn is_unplayed(&self) -> bool {
        self.points_for == 0 && self.points_against == 0
    }
}

fn checked_points(set: usize, field: &'static str, value: i64) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::InvalidScore {
            set,
            field,
            reason: NOT_AN_INTEGER,
        });
    }
    if value > MAX_SET_POINTS {
        return Err(ValidationError::InvalidScore {
            set,
            field,
            reason: "is out of range (at most 99)",
        });
    }
    Ok(value as i32)
}

fn json_points(set: usize, field: &'static str, value: Option<&Value>) -> Result<i32, ValidationError> {
    let value = match value {
        None | Some(Value::Null) => {
            return Err(ValidationError::InvalidScore {
                set,
                field,
                reason: "is required",
            })
        }
        Some(v) => v,
    };

    let points = value.as_i64().ok_or(ValidationError::InvalidScore {
        set,
        field,
        reason: NOT_AN_INTEGER,
    })?;
    checked_points(set, field, points)
}

/// A set that will be persisted, numbered from 1 with no gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedSet {
    pub set_number: i32,
    pub points_for: i32,
    pub points_against: i32,
}

impl PlayedSet {
    pub fn won(&self) -> bool {
        self.points_for > self.points_against
    }

    pub fn lost(&self) -> bool {
        self.points_for < self.points_against
    }
}

/// Everything derived from a match's set scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub sets_for: i32,
    pub sets_against: i32,
    pub points_for: i32,
    pub points_against: i32,
    pub sets: Vec<PlayedSet>,
}

/// Derive a match outcome from its entered set scores.
///
/// # Errors
///
/// - `TooMany` when more than [`MAX_SETS`] scores are given
/// - `NoPlayedSets` when the input is empty or every set is 0-0
///
/// # Example
/// ```
/// use shuttlestats_core::{derive_outcome, MatchResult, SetScore};
///
/// let scores = [
///     SetScore::new(1, 21, 15).unwrap(),
///     SetScore::new(2, 18, 21).unwrap(),
///     SetScore::new(3, 21, 19).unwrap(),
/// ];
/// let outcome = derive_outcome(&scores).unwrap();
/// assert_eq!(outcome.result, MatchResult::Win);
/// assert_eq!((outcome.sets_for, outcome.sets_against), (2, 1));
/// assert_eq!((outcome.points_for, outcome.points_against), (60, 55));
/// ```
pub fn derive_outcome(scores: &[SetScore]) -> Result<MatchOutcome, ValidationError> {
    if scores.len() > MAX_SETS {
        return Err(ValidationError::TooMany {
            field: "sets",
            max: MAX_SETS,
        });
    }

    let sets: Vec<PlayedSet> = scores
        .iter()
        .filter(|s| !s.is_unplayed())
        .enumerate()
        .map(|(i, s)| PlayedSet {
            set_number: i as i32 + 1,
            points_for: s.points_for,
            points_against: s.points_against,
        })
        .collect();

    if sets.is_empty() {
        return Err(ValidationError::NoPlayedSets);
    }

    let mut sets_for = 0;
    let mut sets_against = 0;
    let mut points_for = 0;
    let mut points_against = 0;

    for set in &sets {
        if set.won() {
            sets_for += 1;
        } else if set.lost() {
            sets_against += 1;
        } else {
            tracing::warn!(
                set_number = set.set_number,
                points = set.points_for,
                "tied set recorded; it counts toward neither side"
            );
        }
        points_for += set.points_for;
        points_against += set.points_against;
    }

    Ok(MatchOutcome {
        result: MatchResult::from_sets(sets_for, sets_against),
        sets_for,
        sets_against,
        points_for,
        points_against,
        sets,
    })
}
