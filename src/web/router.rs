//! Router configuration for the HTTP surface.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, download_file_with_credentials, get_share, list_files,
    post_share, preview_file, upload_constraints, upload_file, AppState,
};
use super::middleware::{
    create_cors_layer, file_access_rate_limit, security_headers, RateLimitState,
};
use super::openapi::create_swagger_router;

/// Multipart overhead allowed on top of the upload size limit.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main router.
///
/// Download, share and preview routes are rate limited per client IP.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    rate_limit: Arc<RateLimitState>,
) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    // Routes that hand out file content or access status
    let file_access_routes = Router::new()
        .route(
            "/download/:token",
            get(download_file).post(download_file_with_credentials),
        )
        .route("/share/:key", get(get_share).post(post_share))
        .route("/preview/:token", get(preview_file))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            file_access_rate_limit(state, req, next)
        }));

    let upload_routes = Router::new()
        .route("/upload", get(upload_constraints).post(upload_file))
        .layer(DefaultBodyLimit::max(body_limit));

    let manage_routes = Router::new()
        .route("/download", get(list_files))
        .route("/delete/:key", get(delete_file));

    Router::new()
        .merge(file_access_routes)
        .merge(upload_routes)
        .merge(manage_routes)
        .with_state(app_state)
        .merge(create_health_router())
        .merge(create_swagger_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(CompressionLayer::new()),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::Database;
    use crate::file::FileStorage;

    #[tokio::test]
    async fn test_health_check() {
        let response = create_health_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_rate_limited_routes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let state = Arc::new(AppState::new(db, storage, &Config::default()));
        let router = create_router(state, &[], Arc::new(RateLimitState::new(1)));

        let request = || {
            Request::get("/download/missing.txt")
                .header("X-Forwarded-For", "203.0.113.9")
                .body(Body::empty())
                .unwrap()
        };

        let first = router.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            first.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );

        let second = router.clone().oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        // Listing is not limited
        let list = router
            .oneshot(
                Request::get("/download")
                    .header("X-Forwarded-For", "203.0.113.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::OK);
    }
}
