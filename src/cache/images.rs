//! Image cache over a byte store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::imaging::Image;

use super::key::CacheKey;
use super::store::ByteStore;

/// Gets and stores transformed images by cache key.
#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Look up the image stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss, including when the stored value is not an
    /// image record.
    async fn get_image(&self, key: &CacheKey) -> Result<Option<Image>, CacheError>;

    /// Store `image` under `key`.
    async fn cache_image(&self, key: &CacheKey, image: &Image) -> Result<(), CacheError>;
}

/// [`ImageCache`] that serializes images into a [`ByteStore`].
///
/// Keys are the canonical [`CacheKey`] strings; values are image records as
/// produced by [`Image::to_bytes`].
pub struct ImagesCache<B: ByteStore> {
    store: Arc<B>,
}

impl<B: ByteStore> ImagesCache<B> {
    pub fn new(store: B) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a cache sharing an existing store.
    pub fn with_shared_store(store: Arc<B>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<B> {
        &self.store
    }
}

#[async_trait]
impl<B: ByteStore> ImageCache for ImagesCache<B> {
    async fn get_image(&self, key: &CacheKey) -> Result<Option<Image>, CacheError> {
        match self.store.get(key.as_str()).await? {
            Some(data) => Ok(Image::from_bytes(&data)?),
            None => Ok(None),
        }
    }

    async fn cache_image(&self, key: &CacheKey, image: &Image) -> Result<(), CacheError> {
        let data = image.to_bytes()?;
        self.store.set(key.as_str(), data).await
    }
}
