//! `SQLite`-backed record store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, RecordStore};
use crate::error::{Error, Result};
use crate::record::{Record, RecordId, Resource};

/// Durable record store using `SQLite`.
///
/// The connection sits behind a mutex and every operation runs on the
/// blocking thread pool, so request tasks never block the runtime.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_conn<F, R>(&self, operation: &'static str, op: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| Error::LockPoisoned(operation))?;
            op(&conn)
        })
        .await
        .map_err(|e| Error::internal(format!("{operation} task failed: {e}")))?
    }
}

/// Turn a unique-index violation into [`Error::Duplicate`].
fn map_write_error(err: rusqlite::Error, collection: &'static str, key: Option<&str>) -> Error {
    if let (rusqlite::Error::SqliteFailure(e, _), Some(key)) = (&err, key) {
        if e.code == ErrorCode::ConstraintViolation {
            return Error::Duplicate {
                collection,
                key: key.to_string(),
            };
        }
    }
    err.into()
}

fn decode<T: Resource>(id: &str, body: &str) -> Result<Record<T>> {
    let id = RecordId::parse(id)
        .map_err(|_| Error::internal(format!("stored record has invalid id {id:?}")))?;
    let fields = serde_json::from_str(body)?;
    Ok(Record::new(id, fields))
}

fn row_pair(row: &rusqlite::Row) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn find_all<T: Resource>(&self) -> Result<Vec<Record<T>>> {
        self.with_conn("find_all", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM records WHERE collection = ?1 ORDER BY seq ASC",
            )?;
            let rows = stmt
                .query_map([T::COLLECTION], row_pair)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.iter().map(|(id, body)| decode::<T>(id, body)).collect()
        })
        .await
    }

    async fn find_by_id<T: Resource>(&self, id: RecordId) -> Result<Option<Record<T>>> {
        self.with_conn("find_by_id", move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, body FROM records WHERE collection = ?1 AND id = ?2",
                    params![T::COLLECTION, id.to_string()],
                    row_pair,
                )
                .optional()?;
            row.map(|(id, body)| decode::<T>(&id, &body)).transpose()
        })
        .await
    }

    async fn find_by_unique_key<T: Resource>(&self, key: &str) -> Result<Option<Record<T>>> {
        let key = key.to_string();
        self.with_conn("find_by_unique_key", move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, body FROM records WHERE collection = ?1 AND unique_key = ?2",
                    params![T::COLLECTION, key],
                    row_pair,
                )
                .optional()?;
            row.map(|(id, body)| decode::<T>(&id, &body)).transpose()
        })
        .await
    }

    async fn insert<T: Resource>(&self, fields: T) -> Result<Record<T>> {
        let body = serde_json::to_string(&fields)?;
        self.with_conn("insert", move |conn| {
            let id = RecordId::generate();
            let key = fields.unique_key();
            conn.execute(
                r"
                INSERT INTO records (id, collection, unique_key, body)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![id.to_string(), T::COLLECTION, key, body],
            )
            .map_err(|e| map_write_error(e, T::COLLECTION, key))?;

            debug!("Inserted {} record {}", T::COLLECTION, id);
            Ok(Record::new(id, fields))
        })
        .await
    }

    async fn replace<T: Resource>(&self, id: RecordId, fields: T) -> Result<Option<Record<T>>> {
        let body = serde_json::to_string(&fields)?;
        self.with_conn("replace", move |conn| {
            let key = fields.unique_key();
            let affected = conn
                .execute(
                    r"
                    UPDATE records
                    SET unique_key = ?1, body = ?2, updated_at = datetime('now')
                    WHERE collection = ?3 AND id = ?4
                    ",
                    params![key, body, T::COLLECTION, id.to_string()],
                )
                .map_err(|e| map_write_error(e, T::COLLECTION, key))?;

            if affected == 0 {
                return Ok(None);
            }
            debug!("Replaced {} record {}", T::COLLECTION, id);
            Ok(Some(Record::new(id, fields)))
        })
        .await
    }

    async fn delete_by_id<T: Resource>(&self, id: RecordId) -> Result<bool> {
        self.with_conn("delete_by_id", move |conn| {
            let affected = conn.execute(
                "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                params![T::COLLECTION, id.to_string()],
            )?;
            Ok(affected > 0)
        })
        .await
    }

    async fn count<T: Resource>(&self) -> Result<usize> {
        self.with_conn("count", |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                [T::COLLECTION],
                |row| row.get(0),
            )?;
            usize::try_from(count).map_err(|_| Error::internal(format!("negative count {count}")))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Blog, Person};
    use crate::store::contract;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn temp_db_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rolodex_{tag}_{}.db", std::process::id()))
    }

    fn remove_db(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
        assert_eq!(store.unwrap().path().to_string_lossy(), ":memory:");
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        contract::insert_then_find(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_find_all_in_creation_order() {
        contract::find_all_in_creation_order(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        contract::collections_are_separate(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_duplicate_unique_key_rejected() {
        contract::duplicate_unique_key_rejected(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_blogs_have_no_unique_key() {
        contract::blogs_have_no_unique_key(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_replace_keeps_id() {
        contract::replace_keeps_id(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_replace_missing_returns_none() {
        contract::replace_missing_returns_none(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_replace_into_taken_key_rejected() {
        contract::replace_into_taken_key_rejected(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        contract::delete_is_idempotent(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_delete_frees_unique_key() {
        contract::delete_frees_unique_key(&create_test_store()).await;
    }

    #[tokio::test]
    async fn test_unicode_content() {
        let store = create_test_store();
        let created = store
            .insert(Person::new("Hello 世界 🌍", "+358 40 123"))
            .await
            .unwrap();
        let found = store.find_by_id::<Person>(created.id).await.unwrap().unwrap();
        assert_eq!(found.fields.name, "Hello 世界 🌍");
    }

    #[tokio::test]
    async fn test_reopen_file_keeps_records() {
        let db_path = temp_db_path("reopen");
        remove_db(&db_path);

        let id = {
            let store = SqliteStore::open(&db_path).unwrap();
            store
                .insert(Blog::new("Persisted", "A", "http://p", 3))
                .await
                .unwrap()
                .id
        };

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.path(), db_path);
        let found = store.find_by_id::<Blog>(id).await.unwrap().unwrap();
        assert_eq!(found.fields.title, "Persisted");

        drop(store);
        remove_db(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let nested_path = std::env::temp_dir().join(format!(
            "rolodex_test_{}/nested/db.sqlite",
            std::process::id()
        ));
        let root = nested_path.parent().and_then(Path::parent).unwrap().to_path_buf();
        let _ = std::fs::remove_dir_all(&root);

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_corrupt_body_is_a_fault() {
        let store = create_test_store();
        store
            .with_conn("seed", |conn| {
                conn.execute(
                    "INSERT INTO records (id, collection, body) VALUES (?1, 'blogs', 'not json')",
                    [RecordId::generate().to_string()],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.find_all::<Blog>().await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
