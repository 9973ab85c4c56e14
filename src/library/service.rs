//! Image library for orchestrating image retrieval.
//!
//! The ImageLibrary is the main entry point for image requests. It
//! orchestrates:
//! - Request validation
//! - Cache key derivation
//! - Cache lookups
//! - Origin loading
//! - Transforming
//! - Result caching
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ImageLibrary                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    get_image()                          │    │
//! │  │  1. Validate name     4. Load from origin               │    │
//! │  │  2. Build key         5. Transform                      │    │
//! │  │  3. Check cache       6. Cache & return                 │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌────────────┐     ┌──────────────┐    ┌──────────────────┐  │
//! │    │ ImageCache │     │ OriginLoader │    │ ImageTransformer │  │
//! │    └────────────┘     └──────────────┘    └──────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Model
//!
//! A blank name, or one containing the cache key separator `|`, fails with
//! [`LibraryError::InvalidArgument`]. A name the
//! origin does not know fails with [`LibraryError::NotAvailable`]. Every other
//! failure, including malformed parameters, is wrapped in
//! [`LibraryError::Pipeline`]. Nothing is retried, and concurrent misses for
//! the same key are not coalesced.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, ImageCache, KEY_SEPARATOR};
use crate::error::{LibraryError, TransformError};
use crate::imaging::Image;
use crate::transform::{ImageTransformer, TransformParams};

use super::loader::OriginLoader;

/// Service for retrieving transformed images through the cache.
///
/// # Example
///
/// ```ignore
/// use images_api::cache::{ImagesCache, MemoryByteStore};
/// use images_api::library::{ImageLibrary, LocalFileSystemLoader};
/// use images_api::transform::{TransformEngine, TransformParams};
///
/// let library = ImageLibrary::new(
///     ImagesCache::new(MemoryByteStore::new()),
///     LocalFileSystemLoader::new("/srv/images"),
///     TransformEngine::new(),
/// );
///
/// let params = TransformParams::new().with_resolution("200x100");
/// let image = library.get_image("sample", &params).await?;
/// ```
#[derive(Clone)]
pub struct ImageLibrary {
    cache: Arc<dyn ImageCache>,
    loader: Arc<dyn OriginLoader>,
    transformer: Arc<dyn ImageTransformer>,
}

impl ImageLibrary {
    /// Create a library from its three collaborators.
    pub fn new(
        cache: impl ImageCache + 'static,
        loader: impl OriginLoader + 'static,
        transformer: impl ImageTransformer + 'static,
    ) -> Self {
        Self {
            cache: Arc::new(cache),
            loader: Arc::new(loader),
            transformer: Arc::new(transformer),
        }
    }

    /// Get an image, using the cache when available.
    ///
    /// On a miss the image is loaded from the origin, transformed with
    /// `params`, stored under the same key and returned.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidArgument`] if `image_name` is blank or contains `|`
    /// - [`LibraryError::NotAvailable`] if the origin has no such image
    /// - [`LibraryError::Pipeline`] for anything else, with the cause attached
    pub async fn get_image(
        &self,
        image_name: &str,
        params: &TransformParams,
    ) -> Result<Image, LibraryError> {
        if image_name.trim().is_empty() {
            return Err(LibraryError::InvalidArgument(
                "image name must not be empty or whitespace".to_string(),
            ));
        }
        if image_name.contains(KEY_SEPARATOR) {
            return Err(LibraryError::InvalidArgument(format!(
                "image name must not contain '{KEY_SEPARATOR}'"
            )));
        }

        let cache_key = CacheKey::for_request(image_name, params).map_err(LibraryError::pipeline)?;

        if let Some(cached) = self
            .cache
            .get_image(&cache_key)
            .await
            .map_err(LibraryError::pipeline)?
        {
            debug!(key = %cache_key, "Image cache hit");
            return Ok(cached);
        }
        debug!(key = %cache_key, "Image cache miss");

        let source = self
            .loader
            .load(image_name)
            .await
            .map_err(LibraryError::pipeline)?
            .ok_or_else(|| LibraryError::NotAvailable {
                image_name: image_name.to_string(),
            })?;

        let image = self.transform(source, params).await?;

        self.cache
            .cache_image(&cache_key, &image)
            .await
            .map_err(LibraryError::pipeline)?;

        Ok(image)
    }

    /// Run the transformer on the blocking thread pool.
    async fn transform(&self, image: Image, params: &TransformParams) -> Result<Image, LibraryError> {
        let transformer = Arc::clone(&self.transformer);
        let params = params.clone();

        tokio::task::spawn_blocking(move || transformer.apply(image, &params))
            .await
            .map_err(|e| LibraryError::pipeline(TransformError::Aborted(e.to_string())))?
            .map_err(LibraryError::pipeline)
    }
}

// =============================================================================
// Tests
// =============================================================================
