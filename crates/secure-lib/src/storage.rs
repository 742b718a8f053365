// ============================
// crates/secure-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file and in-memory implementations.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use tokio::fs as tokio_fs;

use crate::error::SecureError;

/// Trait for key/value storage backends
///
/// Backends only ever see opaque strings. Encryption happens above
/// this trait, so an implementation must not assume values are JSON.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch the raw string stored under `key`
    async fn get_item(&self, key: &str) -> Result<Option<String>, SecureError>;

    /// Store `value` under `key`, replacing any existing value
    async fn set_item(&self, key: &str, value: &str) -> Result<(), SecureError>;

    /// Delete `key`; deleting an absent key is not an error
    async fn remove_item(&self, key: &str) -> Result<(), SecureError>;
}

/// Flat-file implementation of the StorageBackend trait
///
/// Keys become file names via URL-safe base64 so arbitrary key strings
/// cannot escape the root directory.
#[derive(Clone)]
pub struct FlatFileBackend {
    root: PathBuf,
}

impl FlatFileBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.root.join(format!("{encoded}.dat"))
    }
}

#[async_trait]
impl StorageBackend for FlatFileBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SecureError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(content))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), SecureError> {
        let path = self.path_for(key);
        tokio_fs::write(&path, value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SecureError> {
        let path = self.path_for(key);
        if path.exists() {
            tokio_fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

/// In-memory implementation of the StorageBackend trait
///
/// Clones share the same underlying map, which lets tests hold a
/// handle onto a backend they have handed to a store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    items: Arc<DashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SecureError> {
        Ok(self.items.get(key).map(|entry| entry.value().clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), SecureError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SecureError> {
        self.items.remove(key);
        Ok(())
    }
}
