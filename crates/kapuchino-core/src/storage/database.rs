//! SQLite-based key-value storage.
//!
//! Provides persistent storage for:
//! - The reminder message, cappuccino counter and photo
//! - Registered weekly notifications (as JSON text)

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::kv::{type_mismatch, KeyValueStore};
use crate::error::{CoreError, DatabaseError};

/// SQLite database holding the `kv` table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/kapuchino.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("kapuchino.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // No declared type on `value`: SQLite keeps each value's storage class.
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value NOT NULL
            );",
        )?;
        Ok(())
    }

    fn get_value(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Value>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put_value(&self, key: &str, value: Value) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get_text(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s)),
            Some(_) => Err(type_mismatch(key, "text")),
        }
    }

    fn set_text(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.put_value(key, Value::Text(value.to_string()))
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, DatabaseError> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(n)),
            Some(_) => Err(type_mismatch(key, "integer")),
        }
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), DatabaseError> {
        self.put_value(key, Value::Integer(value))
    }

    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(Value::Blob(b)) => Ok(Some(b)),
            Some(_) => Err(type_mismatch(key, "blob")),
        }
    }

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError> {
        self.put_value(key, Value::Blob(value.to_vec()))
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
