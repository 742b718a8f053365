// ============================
// crates/secure-lib/src/store.rs
// ============================
//! Encrypted key/value store with its own key index.
//!
//! The backend primitive cannot enumerate keys, so the store keeps a
//! plaintext JSON array of every logical key it has written under a
//! dedicated index key. Reads and deletes go straight to the backend;
//! only `clear` depends on the index being complete.
//!
//! Writers are not serialized: two overlapping mutations can lose an
//! index update (last writer wins). A single session never overlaps
//! its own calls; any use beyond that needs a mutation queue or a
//! compare-and-swap index update in front of this store.
use std::collections::BTreeSet;

use futures_util::future::join_all;
use metrics::counter;
use serde::{de::DeserializeOwned, Serialize};

use crate::crypto::CipherCodec;
use crate::error::SecureError;
use crate::metrics::STORE_WRITE_FAILED;
use crate::storage::StorageBackend;

/// Namespace prepended to every key handed to the backend, so store
/// entries cannot collide with anything else persisted by the app.
pub const STORAGE_PREFIX: &str = "br_secure_";

/// Backend key holding the key index. `STORAGE_PREFIX` plus the
/// `__keys_index` marker.
pub const KEYS_INDEX_KEY: &str = "br_secure___keys_index";

/// Encrypted store over any [`StorageBackend`].
pub struct SecureStore<B> {
    backend: B,
    codec: CipherCodec,
}

impl<B: StorageBackend> SecureStore<B> {
    pub fn new(backend: B, codec: CipherCodec) -> Self {
        Self { backend, codec }
    }

    fn namespaced(key: &str) -> String {
        format!("{STORAGE_PREFIX}{key}")
    }

    /// Read the key index. Absence, unreadable JSON and backend errors
    /// all collapse to an empty set.
    async fn read_key_index(&self) -> BTreeSet<String> {
        match self.backend.get_item(KEYS_INDEX_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw)
                .map(|keys| keys.into_iter().collect())
                .unwrap_or_default(),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read key index");
                BTreeSet::new()
            },
        }
    }

    /// Persist the key index. Failures are logged and swallowed; the
    /// worst outcome is an orphaned entry that `clear` will miss.
    async fn write_key_index(&self, keys: &BTreeSet<String>) {
        let json = match serde_json::to_string(keys) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize key index");
                return;
            },
        };
        if let Err(err) = self.backend.set_item(KEYS_INDEX_KEY, &json).await {
            tracing::error!(error = %err, "failed to persist key index");
        }
    }

    /// Encrypt `value` and store it under `key`.
    ///
    /// Encryption failures propagate, there is no safe default for a
    /// value that could not be protected. Backend write failures are
    /// logged and swallowed, leaving the index untouched. An index
    /// write failing after a successful value write orphans the entry,
    /// which is accepted: the value stays readable and removable by
    /// key, it just will not be visited by `clear`.
    pub async fn set_item<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SecureError> {
        let blob = self.codec.encrypt_value(value)?;

        if let Err(err) = self.backend.set_item(&Self::namespaced(key), &blob).await {
            counter!(STORE_WRITE_FAILED).increment(1);
            tracing::error!(key, error = %err, "failed to store secure value");
            return Ok(());
        }

        let mut index = self.read_key_index().await;
        index.insert(key.to_string());
        self.write_key_index(&index).await;
        Ok(())
    }

    /// Fetch and decrypt the value under `key`.
    ///
    /// Absent keys, backend errors and unreadable blobs all come back
    /// as `None`.
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(&Self::namespaced(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(key, error = %err, "failed to read secure value");
                return None;
            },
        };
        self.codec.decrypt_value(&raw)
    }

    /// Delete `key` and drop it from the index.
    ///
    /// If the backend delete fails the index is deliberately left
    /// alone, so the still-present entry stays discoverable.
    pub async fn remove_item(&self, key: &str) -> Result<(), SecureError> {
        if let Err(err) = self.backend.remove_item(&Self::namespaced(key)).await {
            tracing::error!(key, error = %err, "failed to remove secure value");
            return Ok(());
        }

        let mut index = self.read_key_index().await;
        if index.remove(key) {
            self.write_key_index(&index).await;
        }
        Ok(())
    }

    /// Delete every indexed entry (in parallel), then the index itself.
    ///
    /// The index key is only removed once every listed entry deleted
    /// cleanly; otherwise it is kept so the survivors stay reachable on
    /// the next attempt. Orphaned entries are not visited at all, a
    /// documented limitation of running off the index.
    pub async fn clear(&self) -> Result<(), SecureError> {
        let index = self.read_key_index().await;

        let deletions = index.iter().map(|key| {
            let namespaced = Self::namespaced(key);
            async move { self.backend.remove_item(&namespaced).await }
        });
        let results = join_all(deletions).await;

        if results.iter().any(|result| result.is_err()) {
            tracing::error!("failed to clear some secure entries, keeping key index");
            return Ok(());
        }

        if let Err(err) = self.backend.remove_item(KEYS_INDEX_KEY).await {
            tracing::error!(error = %err, "failed to remove key index");
        }
        Ok(())
    }

    /// Logical keys currently tracked by the index, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.read_key_index().await.into_iter().collect()
    }
}
