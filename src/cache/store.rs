//! Byte-blob key/value stores backing the image cache.
//!
//! # Size-Based Eviction
//!
//! [`MemoryByteStore`] tracks the total size of stored values in bytes and
//! evicts least-recently-used entries when the capacity is exceeded.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;

use crate::error::CacheError;

/// Default capacity: 256MB
pub const DEFAULT_CACHE_CAPACITY: usize = 256 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

// =============================================================================
// ByteStore Trait
// =============================================================================

/// A string-keyed store of byte blobs.
///
/// Consistency under concurrent writes to the same key is the backend's
/// concern; last writer wins is acceptable.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError>;
}

// =============================================================================
// Memory Byte Store
// =============================================================================

/// In-process LRU byte store with size-based capacity.
///
/// # Thread Safety
///
/// The store is thread-safe and can be shared across async tasks via `Arc`.
///
/// # Example
///
/// ```
/// use images_api::cache::{ByteStore, MemoryByteStore};
/// use bytes::Bytes;
///
/// #[tokio::main]
/// async fn main() {
///     let store = MemoryByteStore::new();
///
///     store.set("sample|res=10x10", Bytes::from_static(b"data")).await.unwrap();
///
///     let cached = store.get("sample|res=10x10").await.unwrap();
///     assert_eq!(cached, Some(Bytes::from_static(b"data")));
/// }
/// ```
pub struct MemoryByteStore {
    /// The underlying LRU cache
    cache: RwLock<LruCache<String, Bytes>>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Current total size in bytes
    current_size: RwLock<usize>,
}

impl MemoryByteStore {
    /// Create a new store with default capacity (256MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a new store with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a new store with specified capacity and maximum entries.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(LruCache::new(
                NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN),
            )),
            max_size,
            current_size: RwLock::new(0),
        }
    }

    /// Check if a key is stored without updating LRU order.
    pub async fn contains(&self, key: &str) -> bool {
        let cache = self.cache.read().await;
        cache.contains(key)
    }

    /// Remove a value, returning it if it existed.
    pub async fn remove(&self, key: &str) -> Option<Bytes> {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        let data = cache.pop(key)?;
        *current_size = current_size.saturating_sub(data.len());
        Some(data)
    }

    /// Clear all entries.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;
        cache.clear();
        *current_size = 0;
    }

    /// Get the current number of stored values.
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        let cache = self.cache.read().await;
        cache.is_empty()
    }

    /// Get the current total size of stored values in bytes.
    pub async fn size(&self) -> usize {
        *self.current_size.read().await
    }

    /// Get the maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for MemoryByteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ByteStore for MemoryByteStore {
    /// Marks the entry as recently used.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut cache = self.cache.write().await;
        Ok(cache.get(key).cloned())
    }

    /// Evicts least-recently-used entries until the store is within capacity.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let data_size = value.len();
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        if let Some(old_data) = cache.peek(key) {
            *current_size = current_size.saturating_sub(old_data.len());
        }

        // Entry-count evictions are returned by push and must be accounted for
        if let Some((evicted_key, evicted_data)) = cache.push(key.to_string(), value) {
            if evicted_key != key {
                *current_size = current_size.saturating_sub(evicted_data.len());
            }
        }
        *current_size += data_size;

        while *current_size > self.max_size {
            match cache.pop_lru() {
                Some((_, evicted_data)) => {
                    *current_size = current_size.saturating_sub(evicted_data.len());
                }
                None => break,
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
