//! In-memory object store for development and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use facedex_core::{FacedexError, Result};

use super::ObjectStore;

/// Object store holding everything in a concurrent map.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, Vec<u8>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects, for test assertions.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Keys currently stored, for test assertions.
    pub fn keys(&self) -> Vec<String> {
        self.objects.iter().map(|e| e.key().clone()).collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(key)
            .map(|e| e.value().clone())
            .ok_or_else(|| FacedexError::NotFound(format!("object {key}")))
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_bytes() {
        let store = MemoryObjectStore::new();
        store.put("faces/f1.jpg", &[1, 2, 3]).await.unwrap();
        assert_eq!(store.get("faces/f1.jpg").await.unwrap(), vec![1, 2, 3]);
        assert!(store.exists("faces/f1.jpg").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryObjectStore::new();
        assert!(matches!(
            store.get("nope").await.unwrap_err(),
            FacedexError::NotFound(_)
        ));
    }
}
