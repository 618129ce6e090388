//! University identifier handling
//!
//! Student records are keyed by a university id that exists in two
//! textual forms: a compact form (`UGR103417`) used in URLs and request
//! bodies, and a slash-delimited form (`UGR/1034/17`) used wherever a
//! human reads the id. [`UniversityId`] stores the compact form and
//! accepts either on parse, so callers can paste ids straight from a
//! transcript or a student card.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reasons an input string is not a university id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("university id is empty")]
    Empty,

    #[error("university id must start with an uppercase letter prefix: {0:?}")]
    MissingPrefix(String),

    #[error("university id must end with a digit run: {0:?}")]
    MissingDigits(String),

    #[error("university id contains unexpected characters: {0:?}")]
    InvalidCharacters(String),
}

/// A student's university identifier, held in compact form.
///
/// `Display` prints the compact form so the id is always safe to embed
/// in a URL path; use [`UniversityId::display_form`] for human output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniversityId(String);

impl UniversityId {
    /// Parse either form of a university id.
    ///
    /// Slashes are stripped first, then the remainder must be one run of
    /// uppercase ASCII letters followed by one run of ASCII digits.
    pub fn parse(input: &str) -> Result<Self, ParseIdError> {
        let compact: String = input.chars().filter(|c| *c != '/').collect();
        if compact.is_empty() {
            return Err(ParseIdError::Empty);
        }
        let prefix_len = compact
            .chars()
            .take_while(|c| c.is_ascii_uppercase())
            .count();
        if prefix_len == 0 {
            return Err(ParseIdError::MissingPrefix(input.to_string()));
        }
        let digits = &compact[prefix_len..];
        if digits.is_empty() {
            return Err(ParseIdError::MissingDigits(input.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseIdError::InvalidCharacters(input.to_string()));
        }
        Ok(Self(compact))
    }

    /// Compact form, letters then digits, as the backend expects it.
    pub fn as_compact(&self) -> &str {
        &self.0
    }

    /// Slash-delimited human-readable form.
    ///
    /// The digit run is split into all-but-last-two and last-two groups,
    /// so `UGR103417` renders as `UGR/1034/17`. Ids with fewer than four
    /// digits stay in compact form; there is nothing sensible to split.
    pub fn display_form(&self) -> String {
        let prefix_len = self
            .0
            .chars()
            .take_while(|c| c.is_ascii_uppercase())
            .count();
        let (prefix, digits) = self.0.split_at(prefix_len);
        if digits.len() < 4 {
            return self.0.clone();
        }
        let split = digits.len() - 2;
        format!("{prefix}/{}/{}", &digits[..split], &digits[split..])
    }
}

impl fmt::Display for UniversityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UniversityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_form() {
        let id = UniversityId::parse("UGR103417").unwrap();
        assert_eq!(id.as_compact(), "UGR103417");
    }

    #[test]
    fn parses_display_form_to_compact() {
        let id = UniversityId::parse("UGR/1034/17").unwrap();
        assert_eq!(id.as_compact(), "UGR103417");
    }

    #[test]
    fn display_form_splits_last_two_digits() {
        let id = UniversityId::parse("UGR103417").unwrap();
        assert_eq!(id.display_form(), "UGR/1034/17");

        let long = UniversityId::parse("NSR1234567").unwrap();
        assert_eq!(long.display_form(), "NSR/12345/67");
    }

    #[test]
    fn display_form_of_four_digit_run() {
        let id = UniversityId::parse("AB1234").unwrap();
        assert_eq!(id.display_form(), "AB/12/34");
    }

    #[test]
    fn short_digit_runs_stay_compact() {
        let id = UniversityId::parse("UGR123").unwrap();
        assert_eq!(id.display_form(), "UGR123");
    }

    #[test]
    fn round_trips_between_forms() {
        for raw in ["UGR103417", "NSR1234567", "AB1234", "UGR123"] {
            let id = UniversityId::parse(raw).unwrap();
            let reparsed = UniversityId::parse(&id.display_form()).unwrap();
            assert_eq!(id, reparsed, "{raw} did not survive the round trip");
        }
    }

    #[test]
    fn display_prints_compact_form() {
        let id = UniversityId::parse("UGR/1034/17").unwrap();
        assert_eq!(id.to_string(), "UGR103417");
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(UniversityId::parse(""), Err(ParseIdError::Empty));
        assert_eq!(UniversityId::parse("//"), Err(ParseIdError::Empty));
    }

    #[test]
    fn rejects_lowercase_prefix() {
        assert!(matches!(
            UniversityId::parse("ugr103417"),
            Err(ParseIdError::MissingPrefix(_))
        ));
    }

    #[test]
    fn rejects_missing_digits() {
        assert!(matches!(
            UniversityId::parse("UGR"),
            Err(ParseIdError::MissingDigits(_))
        ));
    }

    #[test]
    fn rejects_trailing_letters() {
        assert!(matches!(
            UniversityId::parse("UGR1034A"),
            Err(ParseIdError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn from_str_matches_parse() {
        let id: UniversityId = "UGR/1034/17".parse().unwrap();
        assert_eq!(id.as_compact(), "UGR103417");
        assert!("1034".parse::<UniversityId>().is_err());
    }
}
