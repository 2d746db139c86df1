//! Validation error types

use std::fmt;

/// Validation error for user input, raised before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., a date)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// A set score is missing, negative, or not an integer.
    /// `set` is 1-based, `field` is the JSON field name.
    InvalidScore {
        set: usize,
        field: &'static str,
        reason: &'static str,
    },

    /// Collection has more entries than allowed
    TooMany { field: &'static str, max: usize },

    /// Every submitted set was 0-0
    NoPlayedSets,

    /// Both sides of a pair name the same player
    SamePlayer,

    /// Request body could not be decoded
    InvalidBody { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::InvalidScore { set, field, reason } => {
                write!(f, "sets[{}].{}: {}", set, field, reason)
            }
            Self::TooMany { field, max } => {
                write!(f, "{} cannot have more than {} entries", field, max)
            }
            Self::NoPlayedSets => write!(f, "sets: at least one set with a nonzero score is required"),
            Self::SamePlayer => write!(f, "players must be different"),
            Self::InvalidBody { reason } => write!(f, "invalid request body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 255,
        };
        assert_eq!(err.to_string(), "name exceeds maximum length of 255 characters");
    }

    #[test]
    fn score_error_names_the_field() {
        let err = ValidationError::InvalidScore {
            set: 2,
            field: "pointsAgainst",
            reason: "must be a non-negative integer",
        };
        assert_eq!(
            err.to_string(),
            "sets[2].pointsAgainst: must be a non-negative integer"
        );
    }
}
