//! Test utilities for integration tests.
//!
//! This module provides mock collaborators with call tracking, plus helpers
//! for creating encoded test images and library folders on disk.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;

use images_api::cache::{CacheKey, ImageCache};
use images_api::error::{CacheError, LoaderError};
use images_api::imaging::{Image, ImageType, Raster};
use images_api::library::OriginLoader;

// =============================================================================
// Mock Origin Loader
// =============================================================================

/// An in-memory origin loader that counts load calls.
#[derive(Clone, Default)]
pub struct MockLoader {
    images: Arc<HashMap<String, Image>>,
    load_count: Arc<AtomicUsize>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image to the loader.
    pub fn with_image(self, image: Image) -> Self {
        let mut images = (*self.images).clone();
        images.insert(image.name().to_string(), image);
        Self {
            images: Arc::new(images),
            load_count: self.load_count,
        }
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OriginLoader for MockLoader {
    async fn load(&self, image_name: &str) -> Result<Option<Image>, LoaderError> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.images.get(image_name).cloned())
    }
}

/// A loader whose every call fails with an I/O error.
pub struct FailingLoader;

#[async_trait]
impl OriginLoader for FailingLoader {
    async fn load(&self, _image_name: &str) -> Result<Option<Image>, LoaderError> {
        Err(LoaderError::Io("simulated disk failure".to_string()))
    }
}

// =============================================================================
// Tracking Image Cache
// =============================================================================

/// An in-memory image cache that records every call.
#[derive(Clone, Default)]
pub struct TrackingCache {
    entries: Arc<RwLock<HashMap<String, Image>>>,
    get_keys: Arc<RwLock<Vec<String>>>,
    set_keys: Arc<RwLock<Vec<String>>>,
}

impl TrackingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys passed to `get_image`, in call order.
    pub async fn get_keys(&self) -> Vec<String> {
        self.get_keys.read().await.clone()
    }

    /// Keys passed to `cache_image`, in call order.
    pub async fn set_keys(&self) -> Vec<String> {
        self.set_keys.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ImageCache for TrackingCache {
    async fn get_image(&self, key: &CacheKey) -> Result<Option<Image>, CacheError> {
        self.get_keys.write().await.push(key.to_string());
        Ok(self.entries.read().await.get(key.as_str()).cloned())
    }

    async fn cache_image(&self, key: &CacheKey, image: &Image) -> Result<(), CacheError> {
        self.set_keys.write().await.push(key.to_string());
        self.entries
            .write()
            .await
            .insert(key.to_string(), image.clone());
        Ok(())
    }
}

// =============================================================================
// Image Helpers
// =============================================================================

/// Create a solid-colour raster of the given size.
pub fn solid_pixels(width: u32, height: u32, colour: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(colour)))
}

/// Create a named, PNG-backed image with a solid colour.
pub fn sample_image(name: &str, width: u32, height: u32) -> Image {
    Image::new(
        name,
        Raster::new(solid_pixels(width, height, [200, 40, 40, 255]), ImageType::Png),
    )
}

/// Create a named image that is fully transparent.
pub fn transparent_image(name: &str, width: u32, height: u32) -> Image {
    Image::new(
        name,
        Raster::new(solid_pixels(width, height, [0, 0, 0, 0]), ImageType::Png),
    )
}

/// Encode a raster in the given container format.
pub fn encode(pixels: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(pixels.to_rgb8())
            .write_to(&mut out, format)
            .unwrap(),
        _ => pixels.write_to(&mut out, format).unwrap(),
    }
    out.into_inner()
}

/// Create encoded PNG bytes with a solid colour.
pub fn create_png(width: u32, height: u32) -> Vec<u8> {
    encode(&solid_pixels(width, height, [30, 144, 255, 255]), ImageFormat::Png)
}

/// Decode a response body, returning the pixels and detected format.
pub fn decode_body(data: &[u8]) -> (DynamicImage, ImageFormat) {
    let format = image::guess_format(data).unwrap();
    let pixels = image::load_from_memory_with_format(data, format).unwrap();
    (pixels, format)
}

// =============================================================================
// Library Folders
// =============================================================================

/// Create a temporary library folder containing `files`.
///
/// Paths are relative to the library root; parent folders are created.
pub fn create_library(files: &[(&str, Vec<u8>)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, data) in files {
        write_file(dir.path(), relative, data);
    }
    dir
}

fn write_file(root: &Path, relative: &str, data: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, data).unwrap();
}
