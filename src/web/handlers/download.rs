//! Download handlers.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::access::AccessAttempt;
use crate::file::Privacy;
use crate::web::dto::{
    AccessQuery, AccessRequest, ApiResponse, FileListItem, FileListResponse, FileResponse,
    ListQuery, ValidatedJson,
};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::{file_response, AppState};

/// GET /download - List files, newest first.
#[utoipa::path(
    get,
    path = "/download",
    tag = "download",
    params(ListQuery),
    responses(
        (status = 200, description = "Files with expiry status", body = FileListResponse),
        (status = 400, description = "Unknown privacy filter")
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    // Blank filter lists everything
    let privacy = query
        .privacy
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse::<Privacy>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let listed = state.share_service().list(privacy).await?;

    let now = Utc::now();
    let files: Vec<FileListItem> = listed
        .into_iter()
        .map(|entry| FileListItem {
            file: FileResponse::from_record(&entry.record, now),
            share_url: entry.link_id.as_deref().map(|id| state.share_url(id)),
        })
        .collect();

    Ok(Json(ApiResponse::new(FileListResponse {
        total: files.len(),
        files,
    })))
}

/// GET /download/:token - Download a file by link id or stored name.
///
/// Credentials for protected files go in the query string.
#[utoipa::path(
    get,
    path = "/download/{token}",
    tag = "download",
    params(
        ("token" = String, Path, description = "Link id or stored name"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Access denied", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Response, ApiError> {
    serve_download(&state, &token, query.into()).await
}

/// POST /download/:token - Download a file with credentials in a JSON body.
#[utoipa::path(
    post,
    path = "/download/{token}",
    tag = "download",
    params(
        ("token" = String, Path, description = "Link id or stored name")
    ),
    request_body = AccessRequest,
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Access denied", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 422, description = "Invalid credentials format", body = ErrorBody)
    )
)]
pub async fn download_file_with_credentials(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ValidatedJson(request): ValidatedJson<AccessRequest>,
) -> Result<Response, ApiError> {
    serve_download(&state, &token, request.into()).await
}

async fn serve_download(
    state: &AppState,
    token: &str,
    attempt: AccessAttempt,
) -> Result<Response, ApiError> {
    let served = state.share_service().download(token, &attempt).await?;
    file_response(served, "attachment")
}
