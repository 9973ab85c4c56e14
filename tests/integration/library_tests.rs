//! Retrieval pipeline tests.
//!
//! Tests verify:
//! - End-to-end retrieval through a real cache and transform engine
//! - Cache hits never touch the origin or the transformer
//! - Misses load once and store once under the key used for the lookup
//! - Error classification for blank names, missing images and bad parameters

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::ImageFormat;

use images_api::cache::{CacheKey, ImagesCache, MemoryByteStore};
use images_api::error::{FormatError, LibraryError, PipelineFailure, TransformError};
use images_api::imaging::{Image, ImageType};
use images_api::library::{ImageLibrary, LocalFileSystemLoader};
use images_api::transform::{ImageTransformer, TransformEngine, TransformParams};

use super::test_utils::{
    create_library, encode, sample_image, solid_pixels, transparent_image, FailingLoader,
    MockLoader, TrackingCache,
};

/// Wraps the real engine and counts calls.
#[derive(Clone, Default)]
struct CountingTransformer {
    inner: TransformEngine,
    calls: Arc<AtomicUsize>,
}

impl CountingTransformer {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageTransformer for CountingTransformer {
    fn apply(&self, image: Image, params: &TransformParams) -> Result<Image, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.apply(image, params)
    }
}

fn tracked_library(loader: MockLoader) -> (ImageLibrary, TrackingCache, CountingTransformer) {
    let cache = TrackingCache::new();
    let transformer = CountingTransformer::default();
    let library = ImageLibrary::new(cache.clone(), loader, transformer.clone());
    (library, cache, transformer)
}

// =============================================================================
// End to End
// =============================================================================

#[tokio::test]
async fn test_sample_round_trip_through_real_cache() {
    let source = sample_image("sample", 20, 20);
    let loader = MockLoader::new().with_image(source.clone());
    let library = ImageLibrary::new(
        ImagesCache::new(MemoryByteStore::new()),
        loader.clone(),
        TransformEngine::new(),
    );

    let first = library
        .get_image("sample", &TransformParams::new())
        .await
        .unwrap();
    assert_eq!(first.name(), "sample");
    assert_eq!(
        first.raster().unwrap().pixels().to_rgba8(),
        source.raster().unwrap().pixels().to_rgba8()
    );
    assert_eq!(loader.load_count(), 1);

    let second = library
        .get_image("sample", &TransformParams::new())
        .await
        .unwrap();
    assert_eq!(
        second.raster().unwrap().pixels().to_rgba8(),
        source.raster().unwrap().pixels().to_rgba8()
    );
    assert_eq!(loader.load_count(), 1);
}

#[tokio::test]
async fn test_jpeg_from_library_folder_matches_on_hit() {
    let file = encode(&solid_pixels(24, 16, [90, 160, 30, 255]), ImageFormat::Jpeg);
    let folder = create_library(&[("photos/photo.jpg", file)]);
    let library = ImageLibrary::new(
        ImagesCache::new(MemoryByteStore::new()),
        LocalFileSystemLoader::new(folder.path()),
        TransformEngine::new(),
    );

    for params in [
        TransformParams::new(),
        TransformParams::new().with_resolution("12x8").with_watermark("hi"),
    ] {
        let miss = library.get_image("photo", &params).await.unwrap();
        let hit = library.get_image("photo", &params).await.unwrap();

        assert_eq!(miss.format(), Some(ImageType::Jpeg));
        assert_eq!(hit, miss);
        assert_eq!(hit.raster().unwrap().encoded(), miss.raster().unwrap().encoded());
    }
}

#[tokio::test]
async fn test_transformed_result_is_cached() {
    let loader = MockLoader::new().with_image(transparent_image("sample", 10, 10));
    let (library, cache, transformer) = tracked_library(loader.clone());
    let params = TransformParams::new()
        .with_resolution("30x20")
        .with_background_colour("Red")
        .with_image_type("bmp");

    let first = library.get_image("sample", &params).await.unwrap();
    let second = library.get_image("sample", &params).await.unwrap();

    let raster = second.raster().unwrap();
    assert_eq!((raster.width(), raster.height()), (30, 20));
    assert_eq!(raster.format(), ImageType::Bmp);
    assert_eq!(first, second);

    assert_eq!(loader.load_count(), 1);
    assert_eq!(transformer.calls(), 1);
    assert_eq!(cache.len().await, 1);
}

// =============================================================================
// Cache Interaction
// =============================================================================

#[tokio::test]
async fn test_miss_sets_under_lookup_key() {
    let loader = MockLoader::new().with_image(sample_image("sample", 20, 20));
    let (library, cache, _) = tracked_library(loader);
    let params = TransformParams::new()
        .with_resolution("100")
        .with_watermark("(c) me")
        .with_image_type("png");

    library.get_image("sample", &params).await.unwrap();

    let get_keys = cache.get_keys().await;
    let set_keys = cache.set_keys().await;
    assert_eq!(get_keys.len(), 1);
    assert_eq!(set_keys, get_keys);

    let expected = CacheKey::for_request("sample", &params).unwrap();
    assert_eq!(set_keys[0], expected.as_str());
    assert!(set_keys[0].starts_with("sample|res=100x100|wm="));
    assert!(set_keys[0].ends_with("|type=png"));
}

#[tokio::test]
async fn test_hit_skips_origin_and_transform() {
    let loader = MockLoader::new().with_image(sample_image("sample", 20, 20));
    let (library, _, transformer) = tracked_library(loader.clone());
    let params = TransformParams::new().with_resolution("8x8");

    library.get_image("sample", &params).await.unwrap();
    library.get_image("sample", &params).await.unwrap();
    library.get_image("sample", &params).await.unwrap();

    assert_eq!(loader.load_count(), 1);
    assert_eq!(transformer.calls(), 1);
}

#[tokio::test]
async fn test_equivalent_parameters_share_an_entry() {
    let loader = MockLoader::new().with_image(sample_image("sample", 20, 20));
    let (library, cache, _) = tracked_library(loader.clone());

    library
        .get_image(
            "sample",
            &TransformParams::new()
                .with_resolution("100")
                .with_background_colour("AliceBlue"),
        )
        .await
        .unwrap();
    library
        .get_image(
            "sample",
            &TransformParams::new()
                .with_resolution("100x100")
                .with_background_colour("f0f8ff"),
        )
        .await
        .unwrap();

    assert_eq!(loader.load_count(), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_concurrent_requests_all_succeed() {
    let loader = MockLoader::new().with_image(sample_image("sample", 20, 20));
    let library = Arc::new(ImageLibrary::new(
        ImagesCache::new(MemoryByteStore::new()),
        loader.clone(),
        TransformEngine::new(),
    ));

    let mut handles = Vec::new();
    for i in 0..8u32 {
        let library = Arc::clone(&library);
        handles.push(tokio::spawn(async move {
            let params = TransformParams::new().with_resolution(format!("{}", 10 + i % 2));
            library.get_image("sample", &params).await
        }));
    }

    for handle in handles {
        let image = handle.await.unwrap().unwrap();
        let raster = image.raster().unwrap();
        assert!(raster.width() == 10 || raster.width() == 11);
    }
    // No coalescing, so concurrent misses may each load
    assert!(loader.load_count() >= 2);
    assert!(loader.load_count() <= 8);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_blank_name_is_not_wrapped() {
    let (library, cache, _) = tracked_library(MockLoader::new());

    let err = library
        .get_image(" ", &TransformParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::InvalidArgument(_)));
    assert!(cache.get_keys().await.is_empty());
}

#[tokio::test]
async fn test_missing_image_is_not_available_and_not_cached() {
    let (library, cache, transformer) = tracked_library(MockLoader::new());

    let err = library
        .get_image("missing", &TransformParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::NotAvailable { .. }));
    assert!(cache.set_keys().await.is_empty());
    assert_eq!(transformer.calls(), 0);
}

#[tokio::test]
async fn test_bad_parameters_are_wrapped_format_errors() {
    let loader = MockLoader::new().with_image(sample_image("sample", 20, 20));
    let (library, _, _) = tracked_library(loader.clone());

    let cases = [
        TransformParams::new().with_resolution("10x10x10"),
        TransformParams::new().with_resolution("0x10"),
        TransformParams::new().with_background_colour("#ff0000"),
        TransformParams::new().with_image_type("webp"),
    ];

    for params in cases {
        let err = library.get_image("sample", &params).await.unwrap_err();
        assert!(
            matches!(err, LibraryError::Pipeline { .. }),
            "expected wrapped error for {:?}",
            params
        );
        assert!(err.format_error().is_some());
    }
    assert_eq!(loader.load_count(), 0);
}

#[tokio::test]
async fn test_resolution_above_limit_is_rejected() {
    let loader = MockLoader::new().with_image(sample_image("sample", 20, 20));
    let (library, _, _) = tracked_library(loader);

    let err = library
        .get_image("sample", &TransformParams::new().with_resolution("10001x10"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.format_error(),
        Some(FormatError::Resolution { .. })
    ));
}

#[tokio::test]
async fn test_loader_failure_is_wrapped() {
    let library = ImageLibrary::new(TrackingCache::new(), FailingLoader, TransformEngine::new());

    let err = library
        .get_image("sample", &TransformParams::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Pipeline {
            source: PipelineFailure::Loader(_)
        }
    ));
    assert!(err.format_error().is_none());
}
