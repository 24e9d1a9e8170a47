//! Requester and record identifiers
//!
//! `RequesterId` is the external chat account issuing a request. `RecordId` is
//! the secondary identifier (a student seat number) whose data is retrieved.
//! Both parse from untrusted chat text, so construction is fallible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest record id accepted from chat input or the record source.
pub const MAX_RECORD_ID_LEN: usize = 32;

/// Identifier validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Input was empty after trimming
    #[error("identifier is empty")]
    Empty,
    /// Requester id was not a decimal integer
    #[error("requester id is not a decimal integer: {0}")]
    NotNumeric(String),
    /// Record id contained characters other than ASCII letters and digits
    #[error("record id contains invalid characters: {0}")]
    InvalidCharacters(String),
    /// Record id exceeded [`MAX_RECORD_ID_LEN`]
    #[error("record id longer than {MAX_RECORD_ID_LEN} characters")]
    TooLong,
}

/// External chat account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(i64);

impl RequesterId {
    /// Wrap a raw account id
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw account id
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for RequesterId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl FromStr for RequesterId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| IdentifierError::NotNumeric(trimmed.to_string()))
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secondary record identifier, e.g. a student seat number.
///
/// Stored trimmed; only ASCII letters and digits are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Validate and wrap a record id
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if trimmed.len() > MAX_RECORD_ID_LEN {
            return Err(IdentifierError::TooLong);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdentifierError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse a cell read from a spreadsheet export.
    ///
    /// Numeric columns round-trip through floats, so `"1234.0"` names the same
    /// record as `"1234"`.
    pub fn from_sheet_cell(cell: &str) -> Result<Self, IdentifierError> {
        let trimmed = cell.trim();
        let normalized = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        Self::parse(normalized)
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl FromStr for RecordId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
