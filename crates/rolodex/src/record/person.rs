use serde::{Deserialize, Serialize};

use super::Resource;
use crate::validate::{null_as_default, require, ValidationError};

/// A phonebook entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    /// Display name, unique across the phonebook.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Phone number, free-form.
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
}

impl Person {
    /// Create a person entry.
    #[must_use]
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }
}

impl Resource for Person {
    const COLLECTION: &'static str = "persons";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    // number is checked before name
    fn validate(&self) -> Result<(), ValidationError> {
        require("number", &self.number, "number is missing")?;
        require("name", &self.name, "name is missing")
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}
