//! Key-value persistence seam.
//!
//! The reminder state only ever stores a handful of scalars and one binary
//! blob, so the store contract is a flat typed key-value map. Reads of a key
//! holding a different type fail with [`DatabaseError::TypeMismatch`].

use crate::error::DatabaseError;

/// A durable map from string keys to text, integer, or binary values.
pub trait KeyValueStore {
    fn get_text(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    fn set_text(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    fn get_int(&self, key: &str) -> Result<Option<i64>, DatabaseError>;

    fn set_int(&self, key: &str, value: i64) -> Result<(), DatabaseError>;

    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError>;

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_text(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).get_text(key)
    }

    fn set_text(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        (**self).set_text(key, value)
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, DatabaseError> {
        (**self).get_int(key)
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), DatabaseError> {
        (**self).set_int(key, value)
    }

    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        (**self).get_blob(key)
    }

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError> {
        (**self).set_blob(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        (**self).remove(key)
    }
}

pub(crate) fn type_mismatch(key: &str, expected: &str) -> DatabaseError {
    DatabaseError::TypeMismatch {
        key: key.to_string(),
        message: format!("expected {expected}"),
    }
}
