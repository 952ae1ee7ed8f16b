//! # Position Store
//!
//! Durable key-value storage for the session's current-question pointer.
//!
//! The session controller writes through [`PositionStore`] and never knows
//! which backend sits behind it:
//!
//! - [`MemoryStore`]: BTreeMap-backed, for tests and embedding
//! - [`RedbStore`]: redb embedded database (ACID, crash safe)
//!
//! Keys are `{namespace}_{user}`; values are the pointer rendered as a
//! decimal string.

use crate::error::{StoreError, backend};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

/// Identity used when no authenticated user is known.
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Build a store key. A missing or blank user falls back to
/// [`ANONYMOUS_IDENTITY`].
#[must_use]
pub fn position_key(namespace: &str, user: Option<&str>) -> String {
    key_with_fallback(namespace, user, ANONYMOUS_IDENTITY)
}

pub(crate) fn key_with_fallback(namespace: &str, user: Option<&str>, anonymous: &str) -> String {
    let identity = user
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(anonymous);
    format!("{namespace}_{identity}")
}

// =============================================================================
// POSITIONSTORE TRAIT
// =============================================================================

/// Minimal durable key-value contract used by the session controller.
pub trait PositionStore {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite a value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: PositionStore + ?Sized> PositionStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

impl<S: PositionStore + ?Sized> PositionStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store. Never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PositionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// REDB STORE
// =============================================================================

/// Single table holding every persisted pointer.
const POSITIONS: TableDefinition<&str, &str> = TableDefinition::new("positions");

/// redb-backed store. One write transaction per mutation.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(backend)?;

        // Create the table up front so read transactions always find it
        let txn = db.begin_write().map_err(backend)?;
        {
            txn.open_table(POSITIONS).map_err(backend)?;
        }
        txn.commit().map_err(backend)?;

        Ok(Self { db })
    }

    /// Every stored `(key, value)` pair in key order.
    pub fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(POSITIONS).map_err(backend)?;

        let mut out = Vec::new();
        for item in table.iter().map_err(backend)? {
            let (key, value) = item.map_err(backend)?;
            out.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(out)
    }
}

impl PositionStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(POSITIONS).map_err(backend)?;
        let value = table.get(key).map_err(backend)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(POSITIONS).map_err(backend)?;
            table.insert(key, value).map_err(backend)?;
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(POSITIONS).map_err(backend)?;
            table.remove(key).map_err(backend)?;
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_user_or_anonymous() {
        assert_eq!(position_key("assessment_page", Some("u-42")), "assessment_page_u-42");
        assert_eq!(position_key("assessment_page", None), "assessment_page_anonymous");
        assert_eq!(position_key("assessment_page", Some("  ")), "assessment_page_anonymous");
    }

    #[test]
    fn memory_store_set_get_delete() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").ok().flatten(), None);

        assert!(store.set("k", "3").is_ok());
        assert_eq!(store.get("k").ok().flatten(), Some("3".to_string()));

        assert!(store.set("k", "4").is_ok());
        assert_eq!(store.len(), 1);

        assert!(store.delete("k").is_ok());
        assert!(store.delete("k").is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn redb_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("positions.redb");

        {
            let mut store = RedbStore::open(&path).expect("open");
            store.set("assessment_page_alice", "5").expect("set");
            store.set("assessment_page_bob", "1").expect("set");
        }

        let mut store = RedbStore::open(&path).expect("reopen");
        assert_eq!(
            store.get("assessment_page_alice").ok().flatten(),
            Some("5".to_string())
        );

        store.delete("assessment_page_alice").expect("delete");
        assert_eq!(store.get("assessment_page_alice").ok().flatten(), None);

        let keys: Vec<_> = store
            .entries()
            .expect("entries")
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["assessment_page_bob".to_string()]);
    }
}
