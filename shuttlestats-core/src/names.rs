//! Player, opponent and pairing names

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ValidationError;

/// Matches the VARCHAR(255) columns in the schema
const MAX_NAME_LEN: usize = 255;

/// "PlayerA / PlayerB", whitespace around each name ignored
static PAIRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\S.*?)\s+/\s+(\S.*?)\s*$").expect("invalid pairing regex"));

fn checked_name(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(name.to_owned())
}

/// Validated, trimmed player display name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    /// Create a player name.
    ///
    /// # Example
    /// ```
    /// use shuttlestats_core::PlayerName;
    ///
    /// assert_eq!(PlayerName::new("  Alice ").unwrap().as_str(), "Alice");
    /// assert!(PlayerName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        checked_name("name", s).map(Self)
    }

    /// Same rules as [`PlayerName::new`], reporting errors against `field`.
    pub fn for_field(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        checked_name(field, s).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PlayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated, trimmed opponent name (free text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentName(String);

impl OpponentName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        checked_name("opponent", s).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Two player names forming a doubles pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub first: PlayerName,
    pub second: PlayerName,
}

impl Pairing {
    /// Build a pairing for pair creation, rejecting self-pairing.
    pub fn new(player1: &str, player2: &str) -> Result<Self, ValidationError> {
        let first = PlayerName::for_field("player1", player1)?;
        let second = PlayerName::for_field("player2", player2)?;
        if first == second {
            return Err(ValidationError::SamePlayer);
        }
        Ok(Self { first, second })
    }

    /// Parse a display name of the form "PlayerA / PlayerB".
    ///
    /// Returns `None` when the text doesn't have that shape; callers treat
    /// the pairing as unknown rather than failing.
    pub fn parse(display: &str) -> Option<Self> {
        let caps = PAIRING_RE.captures(display)?;
        Self::new(&caps[1], &caps[2]).ok()
    }

    /// Display name in the order the players were given.
    pub fn display_name(&self) -> String {
        display_name(self.first.as_str(), self.second.as_str())
    }
}

/// Format two player names as a pair display name.
pub fn display_name(player1: &str, player2: &str) -> String {
    format!("{} / {}", player1, player2)
}
