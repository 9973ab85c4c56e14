//! Images API - serves transformed library images over HTTP.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use images_api::{
    config::Config,
    server::{create_router, RouterConfig},
    ImageLibrary, ImagesCache, LocalFileSystemLoader, MemoryByteStore, TransformEngine,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("images-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Library: {}", config.library_path.display());
    info!(
        "  Cache: {}MB, {} entries",
        config.cache_size / (1024 * 1024),
        config.cache_entries
    );
    info!("  JPEG quality: {}", config.jpeg_quality);

    if !config.library_path.is_dir() {
        error!(
            "Image library folder '{}' was not found",
            config.library_path.display()
        );
        return ExitCode::FAILURE;
    }

    let store = MemoryByteStore::with_capacity_and_entries(config.cache_size, config.cache_entries);
    let library = ImageLibrary::new(
        ImagesCache::new(store),
        LocalFileSystemLoader::new(&config.library_path),
        TransformEngine::with_jpeg_quality(config.jpeg_quality),
    );

    let router = create_router(library, build_router_config(&config));

    let addr = config.bind_address();
    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);
    info!("  curl 'http://{}/api/images/<name>?resolution=200x100'", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "images_api=debug,tower_http=debug"
    } else {
        "images_api=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_jpeg_quality(config.jpeg_quality)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
