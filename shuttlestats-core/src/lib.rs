//! shuttlestats-core: badminton scoring rules
//!
//! Pure domain logic shared by the server and the CLI:
//! - Set scores and match result derivation
//! - Win-ratio math for aggregated statistics
//! - Validated names, pairings and match dates

pub mod date;
pub mod names;
pub mod score;
pub mod stats;
pub mod validation;

pub use date::parse_match_date;
pub use names::{OpponentName, Pairing, PlayerName};
pub use score::{derive_outcome, MatchOutcome, MatchResult, PlayedSet, SetScore, MAX_SETS, MAX_SET_POINTS};
pub use stats::{ratio, StatCounts, StatLine, TeamCounts, TeamTotals};
pub use validation::ValidationError;
