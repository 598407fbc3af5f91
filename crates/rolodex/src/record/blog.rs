use serde::{Deserialize, Serialize};

use super::Resource;
use crate::validate::{null_as_default, require, ValidationError};

/// A blog-list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blog {
    /// Post title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Post author, may be empty.
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    /// Link to the post.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Like count, zero when omitted.
    #[serde(deserialize_with = "null_as_default")]
    pub likes: u64,
}

impl Blog {
    /// Create a blog entry.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        url: impl Into<String>,
        likes: u64,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            url: url.into(),
            likes,
        }
    }
}

impl Resource for Blog {
    const COLLECTION: &'static str = "blogs";

    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title, "Title is required")?;
        require("url", &self.url, "URL is required")
    }
}
