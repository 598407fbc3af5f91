//! In-process record store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::RecordStore;
use crate::error::{Error, Result};
use crate::record::{Record, RecordId, Resource};

#[derive(Debug)]
struct Entry {
    id: RecordId,
    unique_key: Option<String>,
    body: Value,
}

impl Entry {
    fn decode<T: Resource>(&self) -> Result<Record<T>> {
        let fields = serde_json::from_value(self.body.clone())?;
        Ok(Record::new(self.id, fields))
    }
}

type Collections = HashMap<&'static str, Vec<Entry>>;

/// Record store held entirely in memory. Contents are lost on drop.
///
/// Collections are vectors in creation order behind one lock; every
/// operation holds the lock for its whole duration.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| Error::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| Error::LockPoisoned(operation))
    }
}

/// Fail if another entry than `except` already holds `key`.
fn check_unique<T: Resource>(
    entries: &[Entry],
    key: Option<&str>,
    except: Option<RecordId>,
) -> Result<()> {
    let Some(key) = key else {
        return Ok(());
    };
    let taken = entries
        .iter()
        .any(|e| Some(e.id) != except && e.unique_key.as_deref() == Some(key));
    if taken {
        return Err(Error::Duplicate {
            collection: T::COLLECTION,
            key: key.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_all<T: Resource>(&self) -> Result<Vec<Record<T>>> {
        let collections = self.read("find_all")?;
        collections
            .get(T::COLLECTION)
            .map_or_else(
                || Ok(Vec::new()),
                |entries| entries.iter().map(Entry::decode::<T>).collect(),
            )
    }

    async fn find_by_id<T: Resource>(&self, id: RecordId) -> Result<Option<Record<T>>> {
        let collections = self.read("find_by_id")?;
        collections
            .get(T::COLLECTION)
            .and_then(|entries| entries.iter().find(|e| e.id == id))
            .map(Entry::decode::<T>)
            .transpose()
    }

    async fn find_by_unique_key<T: Resource>(&self, key: &str) -> Result<Option<Record<T>>> {
        let collections = self.read("find_by_unique_key")?;
        collections
            .get(T::COLLECTION)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.unique_key.as_deref() == Some(key))
            })
            .map(Entry::decode::<T>)
            .transpose()
    }

    async fn insert<T: Resource>(&self, fields: T) -> Result<Record<T>> {
        let body = serde_json::to_value(&fields)?;
        let mut collections = self.write("insert")?;
        let entries = collections.entry(T::COLLECTION).or_default();

        check_unique::<T>(entries, fields.unique_key(), None)?;

        let id = RecordId::generate();
        entries.push(Entry {
            id,
            unique_key: fields.unique_key().map(str::to_string),
            body,
        });
        debug!("Inserted {} record {}", T::COLLECTION, id);
        Ok(Record::new(id, fields))
    }

    async fn replace<T: Resource>(&self, id: RecordId, fields: T) -> Result<Option<Record<T>>> {
        let body = serde_json::to_value(&fields)?;
        let mut collections = self.write("replace")?;
        let Some(entries) = collections.get_mut(T::COLLECTION) else {
            return Ok(None);
        };
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(None);
        };

        check_unique::<T>(entries, fields.unique_key(), Some(id))?;

        let entry = &mut entries[index];
        entry.unique_key = fields.unique_key().map(str::to_string);
        entry.body = body;
        debug!("Replaced {} record {}", T::COLLECTION, id);
        Ok(Some(Record::new(id, fields)))
    }

    async fn delete_by_id<T: Resource>(&self, id: RecordId) -> Result<bool> {
        let mut collections = self.write("delete_by_id")?;
        let Some(entries) = collections.get_mut(T::COLLECTION) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    async fn count<T: Resource>(&self) -> Result<usize> {
        let collections = self.read("count")?;
        Ok(collections.get(T::COLLECTION).map_or(0, Vec::len))
    }
}
