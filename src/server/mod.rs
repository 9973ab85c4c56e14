//! HTTP server layer for the images API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /api/images/{image_name}?resolution=&backgroundColour=    │
//! │                               &watermark=&imageType=            │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌──────────────────────────────┐ │
//! │  │        handlers          │  │           routes             │ │
//! │  │ (requests, error status) │  │  (router config, CORS)       │ │
//! │  └──────────────────────────┘  └──────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, image_handler, AppState, ErrorResponse, HealthResponse, ImageQueryParams,
    DEFAULT_CACHE_MAX_AGE,
};
pub use routes::{create_router, RouterConfig};
