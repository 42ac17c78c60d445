//! Safe-string validation for clip fields.
//!
//! Every string a clip stores ends up in a URL query or an HTML page, so the
//! alphabet is deliberately small:
//! - ASCII letters and digits
//! - space and `- _ . } [ ] { ( ) |`
//! - `#`, unless disabled via [`SafeCharset::allow_hash`]
//!
//! Directory delimiters and `<`, `>`, `&` are never allowed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Punctuation accepted in addition to ASCII alphanumerics
const SAFE_PUNCTUATION: &str = " -_.}[]{()|";

/// Clip attribute being validated (used in error messages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipField {
    Uid,
    Filename,
    Title,
    ThumbnailFilename,
}

impl fmt::Display for ClipField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipField::Uid => write!(f, "uid"),
            ClipField::Filename => write!(f, "filename"),
            ClipField::Title => write!(f, "title"),
            ClipField::ThumbnailFilename => write!(f, "thumbnail_filename"),
        }
    }
}

/// A string field failed the safe-string check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Validation failed for {field}: got empty string")]
    Empty { field: ClipField },

    #[error("Validation failed for {field}: invalid char {ch:?} in {value:?}")]
    InvalidChar {
        field: ClipField,
        ch: char,
        value: String,
    },
}

impl ValidationError {
    /// The field that failed validation
    pub fn field(&self) -> ClipField {
        match self {
            ValidationError::Empty { field } | ValidationError::InvalidChar { field, .. } => *field,
        }
    }
}

/// The set of characters a clip string may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeCharset {
    /// Whether `#` is part of the alphabet
    pub allow_hash: bool,
}

impl Default for SafeCharset {
    fn default() -> Self {
        Self { allow_hash: true }
    }
}

impl SafeCharset {
    /// Charset without `#`
    pub fn strict() -> Self {
        Self { allow_hash: false }
    }

    /// Check a single character
    pub fn is_safe_char(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || SAFE_PUNCTUATION.contains(ch) || (self.allow_hash && ch == '#')
    }

    /// Non-empty and made only of safe characters
    pub fn is_safe(&self, value: &str) -> bool {
        !value.is_empty() && value.chars().all(|ch| self.is_safe_char(ch))
    }

    /// Validate a present value, reporting the first offending character
    pub fn check(&self, field: ClipField, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty { field });
        }

        match value.chars().find(|ch| !self.is_safe_char(*ch)) {
            Some(ch) => Err(ValidationError::InvalidChar {
                field,
                ch,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Validate an optional value; absent values always pass
    pub fn validate_optional(
        &self,
        field: ClipField,
        value: Option<&str>,
    ) -> Result<(), ValidationError> {
        match value {
            Some(v) => self.check(field, v),
            None => Ok(()),
        }
    }

    /// Strip every character outside the alphabet.
    ///
    /// The result may be empty; callers decide whether what is left is usable.
    pub fn censor(&self, value: &str) -> String {
        value.chars().filter(|ch| self.is_safe_char(*ch)).collect()
    }
}
