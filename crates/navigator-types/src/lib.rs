//! # Navigator Types
//!
//! Small validated primitives shared by every Knowledge Navigator crate.
//!
//! - [`NonEmptyText`] carries free text typed by a user (chat input, documentation topics,
//!   context chunks). Blank input never gets past construction.
//! - [`Identifier`] carries the keys of the static catalogue: component ids, decision-tree
//!   node keys and incident ids.

use std::fmt;
use std::str::FromStr;

/// Maximum length accepted for an [`Identifier`].
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
    /// The identifier exceeded [`MAX_IDENTIFIER_LEN`]
    #[error("identifier exceeds maximum length of {MAX_IDENTIFIER_LEN} characters")]
    TooLong,
    /// The identifier did not start with an ASCII letter
    #[error("identifier must start with an ASCII letter: {0}")]
    InvalidStart(String),
    /// The identifier contained something other than ASCII alphanumerics, `_` or `-`
    #[error("identifier contains invalid characters (only alphanumeric, '_', '-' allowed): {0}")]
    InvalidCharacters(String),
}

/// A string that is guaranteed to contain at least one non-whitespace character.
///
/// Input is trimmed during construction, so two submissions that differ only in
/// surrounding whitespace produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming leading and trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if nothing remains after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Like [`NonEmptyText::new`] but treats blank input as absent.
    ///
    /// Submit handlers use this: a blank submission is a no-op rather than an error.
    pub fn parse_optional(input: impl AsRef<str>) -> Option<Self> {
        Self::new(input).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Key into the static catalogue.
///
/// Identifiers start with an ASCII letter and otherwise contain only ASCII alphanumerics,
/// `_` and `-` (e.g. `unifier`, `check_ps`, `azureHealth`). They are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validates and wraps an identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`TextError`] describing the first rule the input breaks.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let value = input.as_ref();
        if value.is_empty() {
            return Err(TextError::Empty);
        }
        if value.len() > MAX_IDENTIFIER_LEN {
            return Err(TextError::TooLong);
        }
        if !value.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(TextError::InvalidStart(value.to_owned()));
        }
        let ok = value
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'-'));
        if !ok {
            return Err(TextError::InvalidCharacters(value.to_owned()));
        }
        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Images are loading slowly.  ").unwrap();
        assert_eq!(text.as_str(), "Images are loading slowly.");
    }

    #[test]
    fn test_non_empty_text_rejects_blank() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(" \n\t "), Err(TextError::Empty));
        assert!(NonEmptyText::parse_optional("   ").is_none());
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_blank() {
        let err = serde_json::from_str::<NonEmptyText>("\"   \"");
        assert!(err.is_err());
        let ok: NonEmptyText = serde_json::from_str("\" topic \"").unwrap();
        assert_eq!(ok.as_str(), "topic");
    }

    #[test]
    fn test_identifier_accepts_catalogue_keys() {
        for key in ["start", "check_ps", "azureHealth", "risemr", "hl7", "node-2"] {
            assert!(Identifier::new(key).is_ok(), "{key} should be valid");
        }
    }

    #[test]
    fn test_identifier_rejects_bad_input() {
        assert_eq!(Identifier::new(""), Err(TextError::Empty));
        assert!(matches!(
            Identifier::new("7up"),
            Err(TextError::InvalidStart(_))
        ));
        assert!(matches!(
            Identifier::new("has space"),
            Err(TextError::InvalidCharacters(_))
        ));
        assert!(matches!(
            Identifier::new("../etc"),
            Err(TextError::InvalidStart(_))
        ));
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert_eq!(Identifier::new(long), Err(TextError::TooLong));
    }

    #[test]
    fn test_identifier_borrows_as_str_for_map_lookup() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Identifier::new("start").unwrap(), 1);
        assert_eq!(map.get("start"), Some(&1));
    }
}
