//! In-process key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::kv::{type_mismatch, KeyValueStore};
use crate::error::DatabaseError;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Int(i64),
    Blob(Vec<u8>),
}

/// A [`KeyValueStore`] backed by a `HashMap`. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_text(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        match self.lock().get(key) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s.clone())),
            Some(_) => Err(type_mismatch(key, "text")),
        }
    }

    fn set_text(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.lock().insert(key.to_string(), Value::Text(value.to_string()));
        Ok(())
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, DatabaseError> {
        match self.lock().get(key) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(_) => Err(type_mismatch(key, "integer")),
        }
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), DatabaseError> {
        self.lock().insert(key.to_string(), Value::Int(value));
        Ok(())
    }

    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        match self.lock().get(key) {
            None => Ok(None),
            Some(Value::Blob(b)) => Ok(Some(b.clone())),
            Some(_) => Err(type_mismatch(key, "blob")),
        }
    }

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError> {
        self.lock().insert(key.to_string(), Value::Blob(value.to_vec()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.lock().remove(key);
        Ok(())
    }
}
