//! `SQLite` schema definitions for rolodex.
//!
//! All resources share one `records` table; each row belongs to a
//! collection and carries the resource fields as a JSON document.

/// SQL statement to create the records table.
///
/// `seq` preserves creation order; `id` is the public record id.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    collection TEXT NOT NULL,
    unique_key TEXT,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT
)
";

/// SQL statement to create an index on collection for listing.
pub const CREATE_COLLECTION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection, seq)
";

/// SQL statement to enforce per-collection uniqueness of `unique_key`.
///
/// NULL keys never clash, so collections without a unique field are
/// unaffected.
pub const CREATE_UNIQUE_KEY_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_records_unique_key ON records(collection, unique_key)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Base schema creation statements in order.
///
/// The unique-key index is added by migration 2.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RECORDS_TABLE,
    CREATE_COLLECTION_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_records_table_contains_required_columns() {
        assert!(CREATE_RECORDS_TABLE.contains("seq INTEGER PRIMARY KEY"));
        assert!(CREATE_RECORDS_TABLE.contains("id TEXT NOT NULL UNIQUE"));
        assert!(CREATE_RECORDS_TABLE.contains("collection TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("body TEXT NOT NULL"));
    }

    #[test]
    fn test_unique_key_index_is_unique() {
        assert!(CREATE_UNIQUE_KEY_INDEX.contains("UNIQUE INDEX"));
        assert!(!SCHEMA_STATEMENTS.contains(&CREATE_UNIQUE_KEY_INDEX));
    }
}
