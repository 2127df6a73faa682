//! Key-value slot storage
//!
//! A slot is a named, whole-value entry. `put` replaces the entire value in
//! one step; there is no way to observe half of a write.
//!
//! - `SqliteSlots`: on-disk store (`{data_dir}/linkbook.db`)
//! - `MemorySlots`: in-process map, for tests and embedding

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::config::Config;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{init_schema, needs_init};

/// Durable whole-value key-value storage
pub trait KeyValueSlot {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the value stored under `key`
    fn put(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;
}

/// SQLite-backed slot store
pub struct SqliteSlots {
    conn: Connection,
}

impl SqliteSlots {
    /// Open or create the slot database described by `config`
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.database_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(&path)?;
        if needs_init(&conn) {
            init_schema(&conn)?;
        }
        debug!("Opened slot database at {:?}", path);

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueSlot for SqliteSlots {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO kv_slots (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// In-memory slot store
#[derive(Debug, Default, Clone)]
pub struct MemorySlots {
    slots: HashMap<String, Vec<u8>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueSlot for MemorySlots {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.slots.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        }
    }

    #[test]
    fn test_sqlite_get_missing_key() {
        let slots = SqliteSlots::open_in_memory().unwrap();
        assert!(slots.get("links").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_put_overwrites() {
        let mut slots = SqliteSlots::open_in_memory().unwrap();

        slots.put("links", b"first").unwrap();
        slots.put("links", b"second").unwrap();

        assert_eq!(slots.get("links").unwrap().unwrap(), b"second");

        let rows: i64 = slots
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_slots_are_independent() {
        let mut slots = SqliteSlots::open_in_memory().unwrap();

        slots.put("a", b"1").unwrap();
        slots.put("b", b"2").unwrap();

        assert_eq!(slots.get("a").unwrap().unwrap(), b"1");
        assert_eq!(slots.get("b").unwrap().unwrap(), b"2");
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        {
            let mut slots = SqliteSlots::open(&config).unwrap();
            slots.put("links", b"[]").unwrap();
        }

        let slots = SqliteSlots::open(&config).unwrap();
        assert_eq!(slots.get("links").unwrap().unwrap(), b"[]");
        assert!(config.database_path().exists());
    }

    #[test]
    fn test_sqlite_open_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().join("a").join("b"),
            log_file: None,
        };

        SqliteSlots::open(&config).unwrap();
        assert!(config.database_path().exists());
    }

    #[test]
    fn test_sqlite_open_in_unwritable_location_fails() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let config = Config {
            data_dir: PathBuf::from(&blocker).join("data"),
            log_file: None,
        };

        assert!(SqliteSlots::open(&config).is_err());
    }

    #[test]
    fn test_memory_slots() {
        let mut slots = MemorySlots::new();
        assert!(slots.get("links").unwrap().is_none());

        slots.put("links", b"value").unwrap();
        assert_eq!(slots.get("links").unwrap().unwrap(), b"value");

        slots.put("links", b"other").unwrap();
        assert_eq!(slots.get("links").unwrap().unwrap(), b"other");
    }
}
