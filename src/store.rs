// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Key-value store for short-lived protocol artifacts.
//!
//! Every pending authorization request, code, session, access token and
//! cache entry lives here under a string-prefixed key (`pending:`, `code:`,
//! `session:`, `token:`, plus cache keys). Entries carry an explicit TTL
//! and expire lazily; there is no background sweeper. An access that
//! observes an expired entry removes it, and every write sweeps the rest,
//! so abandoned records do not accumulate.
//!
//! `take` reads and deletes under a single write lock, which gives issued
//! codes their at-most-once redemption guarantee: of any number of
//! concurrent exchanges, exactly one observes the record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL'd key-value store shared across request handlers.
#[derive(Clone, Default)]
pub struct KvStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a JSON-serialized value under `key` for `ttl_secs` seconds.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to serialize {key}: {e}");
                return;
            }
        };
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: serialized,
                expires_at: now + Duration::from_secs(ttl_secs),
            },
        );
    }

    /// Fetch a value; an expired entry is a miss and is evicted.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let expired = match entries.get(key) {
            Some(e) if e.expires_at <= now => true,
            Some(e) => return serde_json::from_str(&e.value).ok(),
            None => return None,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    /// Fetch and delete atomically. At most one caller ever receives a
    /// given record; concurrent takers of the same key observe a miss.
    pub async fn take<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.write().await;
        let entry = entries.remove(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        serde_json::from_str(&entry.value).ok()
    }

    pub async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Whether a live (unexpired) entry exists. An expired one is evicted.
    pub async fn contains(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(key).map(|e| e.expires_at > Instant::now()) {
            Some(true) => true,
            Some(false) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }
}

pub fn pending_key(id: &str) -> String {
    format!("pending:{id}")
}

pub fn code_key(code: &str) -> String {
    format!("code:{code}")
}

pub fn session_key(id: &str) -> String {
    format!("session:{id}")
}

pub fn token_key(token: &str) -> String {
    format!("token:{token}")
}

/// Cache key for the on-chain verification verdict.
pub const ONCHAIN_CACHE_KEY: &str = "onchain:identity";
/// Cache key for the combined portfolio document.
pub const PORTFOLIO_CACHE_KEY: &str = "zapper:portfolio";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn put_get_round_trip() {
        let store = KvStore::new();
        store.put("code:abc", &json!({"client_id": "rp"}), 60).await;
        let value: Value = store.get("code:abc").await.unwrap();
        assert_eq!(value["client_id"], "rp");
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let store = KvStore::new();
        store.put("pending:x", &json!({"state": "s"}), 0).await;
        assert!(store.get::<Value>("pending:x").await.is_none());
        assert!(!store.contains("pending:x").await);
    }

    #[tokio::test]
    async fn expired_entries_are_evicted_not_just_hidden() {
        let store = KvStore::new();
        for i in 0..100 {
            store
                .put(&pending_key(&i.to_string()), &json!({"n": i}), 0)
                .await;
        }
        for i in 0..100 {
            assert!(store
                .get::<Value>(&pending_key(&i.to_string()))
                .await
                .is_none());
        }
        assert!(store.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn take_consumes_exactly_once() {
        let store = KvStore::new();
        store.put("code:once", &json!({"n": 1}), 60).await;

        let first: Option<Value> = store.take("code:once").await;
        assert!(first.is_some());

        // Second redemption of the same code must observe a miss.
        let second: Option<Value> = store.take("code:once").await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn concurrent_takes_yield_one_winner() {
        let store = KvStore::new();
        store.put("code:race", &json!({"n": 1}), 60).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.take::<Value>("code:race").await.is_some()
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[test]
    fn key_namespaces() {
        assert_eq!(pending_key("a"), "pending:a");
        assert_eq!(code_key("b"), "code:b");
        assert_eq!(session_key("c"), "session:c");
        assert_eq!(token_key("d"), "token:d");
    }
}
