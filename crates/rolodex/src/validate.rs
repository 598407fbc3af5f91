//! Required-field checks for incoming records.
//!
//! Checks are pure. Each resource runs them in a fixed order and reports the
//! first violation only.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A required field was absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    field: &'static str,
    message: &'static str,
}

impl ValidationError {
    /// Report `field` as missing with the client-facing `message`.
    #[must_use]
    pub fn missing(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }

    /// Name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Message surfaced in the `{"error": ...}` response body.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// Fail with `message` when `value` is empty.
///
/// Absent JSON fields deserialize to the empty string, so this covers both.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` if `value` is empty.
pub fn require(
    field: &'static str,
    value: &str,
    message: &'static str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::missing(field, message));
    }
    Ok(())
}

/// Deserialize a field, reading JSON `null` as the type's default.
///
/// Pair with `#[serde(default)]` so an explicit `null` and an absent field
/// reach [`require`] the same way.
///
/// # Errors
///
/// Returns the deserializer's error for values that are neither `null` nor a
/// valid `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present() {
        assert!(require("title", "React patterns", "Title is required").is_ok());
    }

    #[test]
    fn test_require_empty() {
        let err = require("title", "", "Title is required").unwrap_err();
        assert_eq!(err.field(), "title");
        assert_eq!(err.message(), "Title is required");
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_require_whitespace_counts_as_present() {
        assert!(require("name", " ", "name is missing").is_ok());
    }

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(default)]
    struct Named {
        #[serde(deserialize_with = "null_as_default")]
        name: String,
    }

    #[test]
    fn test_null_reads_as_empty() {
        let named: Named = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(named.name, "");
        assert!(require("name", &named.name, "name is missing").is_err());
    }

    #[test]
    fn test_null_as_default_keeps_type_errors() {
        assert!(serde_json::from_str::<Named>(r#"{"name": 7}"#).is_err());
    }
}
