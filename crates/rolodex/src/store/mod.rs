//! Record persistence for rolodex.
//!
//! Handlers talk to persistence only through [`RecordStore`]. Two backends
//! implement it:
//! - [`SqliteStore`], the durable default, backed by `SQLite`
//! - [`MemoryStore`], an in-process map for tests and throwaway runs
//!
//! Both keep the unique key of each collection unique themselves, so a
//! handler's find-then-insert pre-check cannot be raced into a duplicate.
//! Each operation is atomic on its own; no multi-operation transactions are
//! exposed.

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{Record, RecordId, Resource};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Async access to stored records, one collection per [`Resource`] type.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Every record in the collection, in creation order.
    async fn find_all<T: Resource>(&self) -> Result<Vec<Record<T>>>;

    /// The record with `id`, if any.
    async fn find_by_id<T: Resource>(&self, id: RecordId) -> Result<Option<Record<T>>>;

    /// The record whose unique key equals `key`, if any.
    async fn find_by_unique_key<T: Resource>(&self, key: &str) -> Result<Option<Record<T>>>;

    /// Persist `fields` under a freshly generated id.
    ///
    /// Fails with [`crate::Error::Duplicate`] if the unique key is taken.
    async fn insert<T: Resource>(&self, fields: T) -> Result<Record<T>>;

    /// Replace the fields of the record with `id`, keeping the id.
    ///
    /// Returns `None` when no such record exists.
    async fn replace<T: Resource>(&self, id: RecordId, fields: T) -> Result<Option<Record<T>>>;

    /// Remove the record with `id`. Returns whether anything was removed.
    async fn delete_by_id<T: Resource>(&self, id: RecordId) -> Result<bool>;

    /// Number of records in the collection.
    async fn count<T: Resource>(&self) -> Result<usize>;
}
