//! Configuration management for the images API.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `IMAGES_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use images_api::config::Config;
//!
//! let config = Config::parse();
//! println!("Serving {} on {}", config.library_path.display(), config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `IMAGES_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMAGES_PORT` - Server port (default: 3000)
//! - `IMAGES_LIBRARY_PATH` - Root folder of the image library (required)
//! - `IMAGES_CACHE_SIZE` - Cache capacity in bytes (default: 256MB)
//! - `IMAGES_CACHE_ENTRIES` - Maximum cached images (default: 10000)
//! - `IMAGES_JPEG_QUALITY` - JPEG output quality (default: 90)
//! - `IMAGES_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `IMAGES_CORS_ORIGINS` - Comma-separated allowed origins (default: any)

use std::path::PathBuf;

use clap::Parser;

use crate::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_ENTRIES};
use crate::imaging::{DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};
use crate::server::DEFAULT_CACHE_MAX_AGE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Images API - serves resized, recoloured and watermarked library images.
#[derive(Parser, Debug, Clone)]
#[command(name = "images-api")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMAGES_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMAGES_PORT")]
    pub port: u16,

    // =========================================================================
    // Library Configuration
    // =========================================================================
    /// Root folder searched (recursively) for library images.
    #[arg(long, env = "IMAGES_LIBRARY_PATH")]
    pub library_path: PathBuf,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Maximum total size of cached images in bytes.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "IMAGES_CACHE_SIZE")]
    pub cache_size: usize,

    /// Maximum number of cached images.
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES, env = "IMAGES_CACHE_ENTRIES")]
    pub cache_entries: usize,

    /// JPEG quality for encoded output (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "IMAGES_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IMAGES_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMAGES_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.library_path.as_os_str().is_empty() {
            return Err(
                "Library path is required. Set --library-path or IMAGES_LIBRARY_PATH".to_string(),
            );
        }

        if self.cache_size == 0 {
            return Err("cache_size must be greater than 0".to_string());
        }
        if self.cache_entries == 0 {
            return Err("cache_entries must be greater than 0".to_string());
        }

        if !(MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&self.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between {} and {}",
                MIN_JPEG_QUALITY, MAX_JPEG_QUALITY
            ));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
