//! Record types served by rolodex.
//!
//! A [`Record`] pairs a store-assigned [`RecordId`] with the fields of one
//! [`Resource`]. Records serialize flat: `{"id": "...", "name": "...", ...}`.

mod blog;
mod id;
mod person;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

pub use blog::Blog;
pub use id::RecordId;
pub use person::Person;

/// A flat record type the service can store and expose over HTTP.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage namespace and URL segment, e.g. `"persons"`.
    const COLLECTION: &'static str;

    /// Field whose value must be unique within the collection, if any.
    const UNIQUE_FIELD: Option<&'static str> = None;

    /// Check required fields, reporting the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Value of [`Self::UNIQUE_FIELD`] for this record.
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// A stored resource together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Identifier assigned by the store on creation.
    pub id: RecordId,
    /// The resource fields.
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    /// Pair `fields` with `id`.
    #[must_use]
    pub fn new(id: RecordId, fields: T) -> Self {
        Self { id, fields }
    }
}
