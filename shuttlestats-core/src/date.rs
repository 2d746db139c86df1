//! Match date parsing

use chrono::NaiveDate;

use crate::ValidationError;

/// Canonical storage and wire format
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Day-first entry format used by the mobile client in UK locales
const UK_FORMAT: &str = "%d/%m/%Y";

/// Parse a calendar match date.
///
/// Accepts `YYYY-MM-DD` and `DD/MM/YYYY`.
pub fn parse_match_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Empty { field: "date" });
    }

    NaiveDate::parse_from_str(raw, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, UK_FORMAT))
        .map_err(|_| ValidationError::InvalidFormat {
            field: "date",
            reason: "expected a calendar date as YYYY-MM-DD",
        })
}
