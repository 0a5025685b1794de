//! HTTP surface for fileshare.
//!
//! Upload, download, preview, share and delete routes over the share
//! service, plus health and OpenAPI documentation endpoints.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
