use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use database_adapter::db::{DbError, SlotStore};

/// Slot store living only as long as the process
#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    storage: Mutex<HashMap<String, String>>,
}

impl InMemorySlotStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a slot before handing the store out
    #[must_use]
    pub fn with_slot(self, key: &str, value: &str) -> Self {
        self.slots().insert(key.to_string(), value.to_string());
        self
    }

    /// Copy of every slot currently stored
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.slots().clone()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Slots are plain strings, a panic elsewhere cannot leave them half-written
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStore for InMemorySlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        Ok(self.slots().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.slots().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DbError> {
        self.slots().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemorySlotStore::new();
        assert_eq!(store.get("currentUser").await.unwrap(), None);

        store.set("currentUser", "alice").await.unwrap();
        assert_eq!(
            store.get("currentUser").await.unwrap(),
            Some("alice".to_string())
        );
        assert!(store.contains("currentUser").await.unwrap());

        store.remove("currentUser").await.unwrap();
        assert!(!store.contains("currentUser").await.unwrap());
    }

    #[tokio::test]
    async fn test_seeded_slots_are_visible() {
        let store = InMemorySlotStore::new()
            .with_slot("rememberMe", "true")
            .with_slot("savedLogin", "bob");

        assert_eq!(store.get("savedLogin").await.unwrap(), Some("bob".into()));
        assert_eq!(store.snapshot().len(), 2);
    }
}
