//! Origin image loaders.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::LoaderError;
use crate::imaging::{decode_any, supported_extensions, Image, Raster};

// =============================================================================
// OriginLoader Trait
// =============================================================================

/// Fetches untransformed images by name.
///
/// This abstraction allows the library to work with different storage
/// backends without being tied to a specific implementation.
#[async_trait]
pub trait OriginLoader: Send + Sync {
    /// Load the image called `image_name`.
    ///
    /// Returns `Ok(None)` if the origin has no such image.
    async fn load(&self, image_name: &str) -> Result<Option<Image>, LoaderError>;
}

// =============================================================================
// Local Filesystem Loader
// =============================================================================

/// Loads images from a directory tree on the local filesystem.
///
/// An image called `sample` is any file named `sample.<ext>` anywhere under
/// the root, where `<ext>` is a supported image extension (matched
/// case-insensitively). Directories are searched breadth-first in name order
/// and the first match wins.
///
/// # Example
///
/// ```ignore
/// use images_api::library::{LocalFileSystemLoader, OriginLoader};
///
/// let loader = LocalFileSystemLoader::new("/srv/images");
///
/// // Finds /srv/images/2019/sample.png
/// let image = loader.load("sample").await?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileSystemLoader {
    root: PathBuf,
}

impl LocalFileSystemLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the file for `image_name`, if any.
    async fn find_image_path(&self, image_name: &str) -> Result<Option<PathBuf>, LoaderError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(LoaderError::LibraryNotFound {
                    path: self.root.display().to_string(),
                })
            }
        }

        let mut pending = VecDeque::from([self.root.clone()]);
        while let Some(dir) = pending.pop_front() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(io_error)?;
            let mut files = Vec::new();
            let mut dirs = Vec::new();

            while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
                let file_type = entry.file_type().await.map_err(io_error)?;
                if file_type.is_dir() {
                    dirs.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }

            files.sort();
            if let Some(found) = files.into_iter().find(|p| is_image_file(p, image_name)) {
                return Ok(Some(found));
            }

            dirs.sort();
            pending.extend(dirs);
        }

        Ok(None)
    }
}

#[async_trait]
impl OriginLoader for LocalFileSystemLoader {
    async fn load(&self, image_name: &str) -> Result<Option<Image>, LoaderError> {
        if image_name.trim().is_empty() {
            return Err(LoaderError::InvalidIdentifier(image_name.to_string()));
        }

        let Some(path) = self.find_image_path(image_name).await? else {
            debug!(image_name, "No library file matches image name");
            return Ok(None);
        };

        debug!(image_name, path = %path.display(), "Loading library image");

        let data = tokio::fs::read(&path).await.map_err(io_error)?;
        let (pixels, format) = decode_any(&data).map_err(|source| LoaderError::Decode {
            path: path.display().to_string(),
            source,
        })?;

        let raster = Raster::with_encoded(pixels, format, Bytes::from(data));
        Ok(Some(Image::new(image_name, raster)))
    }
}

/// Returns `true` if `path` is `<image_name>.<supported ext>`.
fn is_image_file(path: &Path, image_name: &str) -> bool {
    let stem_matches = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == image_name);

    stem_matches
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| supported_extensions().any(|e| e.eq_ignore_ascii_case(ext)))
}

fn io_error(err: std::io::Error) -> LoaderError {
    LoaderError::Io(err.to_string())
}
