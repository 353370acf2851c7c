//! Session persistence port definition.

use crate::domain::errors::StorageError;

/// Key/value persistence for session state.
///
/// Synchronous so that logout can run from inside the unauthorized callback.
pub trait SessionStoragePort: Send + Sync {
    /// Reads a stored value.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value; missing keys are not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory session storage for testing.
    #[derive(Default)]
    pub struct MemoryStorage {
        items: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates storage with one prefilled item.
        pub fn with_item(self, key: &str, value: &str) -> Self {
            self.items.lock().insert(key.to_string(), value.to_string());
            self
        }

        pub fn contains(&self, key: &str) -> bool {
            self.items.lock().contains_key(key)
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.items.lock().get(key).cloned()
        }
    }

    impl SessionStoragePort for MemoryStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.items.lock().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.items.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.items.lock().remove(key);
            Ok(())
        }
    }
}
