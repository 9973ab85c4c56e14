//! Caching layer for transformed images.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              ImageLibrary               │
//! └────────────────────┬────────────────────┘
//!                      │  CacheKey
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               ImagesCache               │
//! │   (Image ⇄ tagged binary record)        │
//! └────────────────────┬────────────────────┘
//!                      │  canonical key string, bytes
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          ByteStore (MemoryByteStore)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`CacheKey`]: canonical key derived from an image name and transform parameters
//! - [`ImageCache`] / [`ImagesCache`]: image-level get/set over a byte store
//! - [`ByteStore`] / [`MemoryByteStore`]: string-keyed blob store with LRU eviction

mod images;
mod key;
mod store;

pub use images::{ImageCache, ImagesCache};
pub use key::{hash_watermark, CacheKey, KEY_SEPARATOR};
pub use store::{ByteStore, MemoryByteStore, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_ENTRIES};
