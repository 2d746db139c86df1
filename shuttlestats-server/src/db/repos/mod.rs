//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool; every call acquires and releases its own connection
//! - Uniqueness is left to DB constraints (no check-then-insert)
//! - Multi-row writes run in one transaction

pub mod matches;
pub mod pairs;
pub mod players;
pub mod stats;

pub use matches::{MatchGroup, MatchRecord, MatchRepo, NewMatch, SetRecord};
pub use pairs::{Pair, PairRepo, PairStats};
pub use players::{Player, PlayerRepo, PlayerStats};
pub use stats::StatsRepo;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} {detail}")]
    Conflict {
        resource: &'static str,
        detail: String,
    },

    #[error("corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl DbError {
    /// Map a unique violation to `Conflict`, passing other errors through.
    pub(crate) fn on_conflict(e: sqlx::Error, resource: &'static str, detail: String) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::Conflict { resource, detail }
            }
            _ => Self::Sqlx(e),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
