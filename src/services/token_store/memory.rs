use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::token_store::store::{StoreResult, TokenStore};

/// Process-local token store.
///
/// Values live only as long as the process; a restart forgets every token.
/// Single reads and writes are atomic, nothing more.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, token: &str) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn empty_store_returns_none() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get("refresh_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = MemoryTokenStore::new();
        store.set("refresh_token", "R1").await.unwrap();
        store.set("refresh_token", "R2").await.unwrap();

        assert_eq!(
            store.get("refresh_token").await.unwrap().as_deref(),
            Some("R2")
        );
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let store = MemoryTokenStore::new();
        store.set("alice", "RA").await.unwrap();
        store.set("bob", "RB").await.unwrap();

        assert_eq!(store.get("alice").await.unwrap().as_deref(), Some("RA"));
        assert_eq!(store.get("bob").await.unwrap().as_deref(), Some("RB"));
    }

    #[tokio::test]
    async fn concurrent_writers_leave_one_of_their_values() {
        let store = Arc::new(MemoryTokenStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.set("slot", &format!("R{i}")).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let value = store.get("slot").await.unwrap().unwrap();
        let n: usize = value.trim_start_matches('R').parse().unwrap();
        assert!(n < 16);
    }
}
