//! Local filesystem loader tests.
//!
//! Tests verify:
//! - Images are found by file stem in nested folders
//! - Breadth-first, name-ordered search picks the shallowest match
//! - Unsupported or undecodable files are reported correctly

use image::ImageFormat;

use images_api::error::LoaderError;
use images_api::imaging::ImageType;
use images_api::library::{LocalFileSystemLoader, OriginLoader};

use super::test_utils::{create_library, create_png, encode, solid_pixels};

#[tokio::test]
async fn test_load_from_root() {
    let library = create_library(&[("sample.png", create_png(20, 20))]);
    let loader = LocalFileSystemLoader::new(library.path());

    let image = loader.load("sample").await.unwrap().unwrap();
    let raster = image.raster().unwrap();

    assert_eq!(image.name(), "sample");
    assert_eq!((raster.width(), raster.height()), (20, 20));
    assert_eq!(raster.format(), ImageType::Png);
}

#[tokio::test]
async fn test_load_from_nested_folder() {
    let library = create_library(&[
        ("2019/holiday/beach.jpg", encode(&solid_pixels(16, 8, [255, 255, 0, 255]), ImageFormat::Jpeg)),
        ("2019/notes.txt", b"not an image".to_vec()),
    ]);
    let loader = LocalFileSystemLoader::new(library.path());

    let image = loader.load("beach").await.unwrap().unwrap();
    let raster = image.raster().unwrap();

    assert_eq!((raster.width(), raster.height()), (16, 8));
    assert_eq!(raster.format(), ImageType::Jpeg);
}

#[tokio::test]
async fn test_loaded_raster_keeps_file_bytes() {
    let file = encode(&solid_pixels(16, 8, [255, 255, 0, 255]), ImageFormat::Jpeg);
    let library = create_library(&[("beach.jpg", file.clone())]);
    let loader = LocalFileSystemLoader::new(library.path());

    let image = loader.load("beach").await.unwrap().unwrap();
    let raster = image.raster().unwrap();

    assert_eq!(raster.encoded().map(|b| b.to_vec()), Some(file.clone()));
    assert_eq!(raster.encode().unwrap(), file);
}

#[tokio::test]
async fn test_format_detected_from_content() {
    let library = create_library(&[
        ("a.bmp", encode(&solid_pixels(4, 4, [1, 2, 3, 255]), ImageFormat::Bmp)),
        ("b.gif", encode(&solid_pixels(4, 4, [1, 2, 3, 255]), ImageFormat::Gif)),
        ("c.tiff", encode(&solid_pixels(4, 4, [1, 2, 3, 255]), ImageFormat::Tiff)),
    ]);
    let loader = LocalFileSystemLoader::new(library.path());

    for (name, expected) in [
        ("a", ImageType::Bmp),
        ("b", ImageType::Gif),
        ("c", ImageType::Tiff),
    ] {
        let image = loader.load(name).await.unwrap().unwrap();
        assert_eq!(image.format(), Some(expected));
    }
}

#[tokio::test]
async fn test_shallowest_match_wins() {
    let library = create_library(&[
        ("a/deep/sample.png", create_png(30, 30)),
        ("sample.png", create_png(10, 10)),
    ]);
    let loader = LocalFileSystemLoader::new(library.path());

    let image = loader.load("sample").await.unwrap().unwrap();
    assert_eq!(image.raster().unwrap().width(), 10);
}

#[tokio::test]
async fn test_sibling_folders_searched_in_name_order() {
    let library = create_library(&[
        ("b/sample.png", create_png(20, 20)),
        ("a/sample.png", create_png(10, 10)),
    ]);
    let loader = LocalFileSystemLoader::new(library.path());

    let image = loader.load("sample").await.unwrap().unwrap();
    assert_eq!(image.raster().unwrap().width(), 10);
}

#[tokio::test]
async fn test_missing_image_is_none() {
    let library = create_library(&[
        ("sample.png", create_png(10, 10)),
        ("other.txt", b"hello".to_vec()),
    ]);
    let loader = LocalFileSystemLoader::new(library.path());

    assert!(loader.load("missing").await.unwrap().is_none());
    assert!(loader.load("other").await.unwrap().is_none());
    assert!(loader.load("Sample").await.unwrap().is_none());
}

#[tokio::test]
async fn test_undecodable_file_is_an_error() {
    let library = create_library(&[("broken.png", b"definitely not a png".to_vec())]);
    let loader = LocalFileSystemLoader::new(library.path());

    let result = loader.load("broken").await;
    assert!(matches!(result, Err(LoaderError::Decode { .. })));
}

#[tokio::test]
async fn test_missing_library_folder() {
    let library = create_library(&[]);
    let root = library.path().join("does-not-exist");
    let loader = LocalFileSystemLoader::new(&root);

    let result = loader.load("sample").await;
    assert!(matches!(result, Err(LoaderError::LibraryNotFound { .. })));
}
