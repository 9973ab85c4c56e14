//! Image library: origin loading and the cached retrieval pipeline.
//!
//! - [`OriginLoader`] / [`LocalFileSystemLoader`]: fetch untransformed images by name
//! - [`ImageLibrary`]: validate, check the cache, load, transform, store

mod loader;
mod service;

pub use loader::{LocalFileSystemLoader, OriginLoader};
pub use service::ImageLibrary;
