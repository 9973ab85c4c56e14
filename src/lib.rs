//! # Images API
//!
//! An image server that fetches named images from a library folder and
//! serves them resized, recoloured, watermarked and re-encoded on request.
//!
//! ## Features
//!
//! - **Parameter-addressed caching**: every distinct combination of image name
//!   and transform parameters is computed once and then served from the cache
//! - **Transforms**: resize to `W` or `WxH`, fill transparent areas with a
//!   named or hex colour, stamp a text watermark, convert between formats
//! - **Formats**: PNG, JPEG, BMP, GIF and TIFF in and out
//!
//! ## Architecture
//!
//! - [`imaging`] - Image value types and parameter parsers
//! - [`transform`] - The transform engine and watermark renderer
//! - [`cache`] - Cache keys, image cache and byte store
//! - [`library`] - Origin loader and the retrieval pipeline
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use images_api::{
//!     create_router, ImageLibrary, ImagesCache, LocalFileSystemLoader, MemoryByteStore,
//!     RouterConfig, TransformEngine,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let library = ImageLibrary::new(
//!         ImagesCache::new(MemoryByteStore::new()),
//!         LocalFileSystemLoader::new("/srv/images"),
//!         TransformEngine::new(),
//!     );
//!
//!     let router = create_router(library, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod imaging;
pub mod library;
pub mod server;
pub mod transform;

// Re-export commonly used types
pub use cache::{ByteStore, CacheKey, ImageCache, ImagesCache, MemoryByteStore};
pub use config::Config;
pub use error::{
    CacheError, FormatError, ImageError, LibraryError, LoaderError, PipelineFailure,
    TransformError,
};
pub use imaging::{BackgroundColour, Image, ImageType, Raster, Resolution};
pub use library::{ImageLibrary, LocalFileSystemLoader, OriginLoader};
pub use server::{create_router, AppState, RouterConfig};
pub use transform::{ImageTransformer, TransformEngine, TransformParams};
