//! Inline preview handler.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use std::sync::Arc;

use crate::web::dto::AccessQuery;
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::{file_response, AppState};

/// GET /preview/:token - Show a file inline.
///
/// Previews go through the same access rules as downloads but do not count
/// against the download limit. Only media, text and PDF types are served.
#[utoipa::path(
    get,
    path = "/preview/{token}",
    tag = "download",
    params(
        ("token" = String, Path, description = "Stored name or link id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "File content, inline"),
        (status = 403, description = "Access denied", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 415, description = "File type cannot be previewed", body = ErrorBody)
    )
)]
pub async fn preview_file(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Response, ApiError> {
    let served = state.share_service().preview(&token, &query.into()).await?;
    file_response(served, "inline")
}
