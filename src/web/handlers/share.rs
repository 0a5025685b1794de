//! Share link handlers.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::access::AccessAttempt;
use crate::file::is_link_id;
use crate::web::dto::{
    AccessQuery, AccessRequest, ApiResponse, SharePageResponse, ShareLinkResponse, ValidatedJson,
};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;

/// GET /share/:key - Share page for a link id, or the link for a file id.
///
/// A 32-character lowercase hex key is a link id and returns the share
/// page status. Any other key is treated as a file id and returns that
/// file's link, minting it on first request.
#[utoipa::path(
    get,
    path = "/share/{key}",
    tag = "share",
    params(
        ("key" = String, Path, description = "Link id or file id"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "Share page (link id) or share link (file id)", body = SharePageResponse),
        (status = 404, description = "Unknown link or file", body = ErrorBody)
    )
)]
pub async fn get_share(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Response, ApiError> {
    if is_link_id(&key) {
        let page = share_page(&state, &key, query.into()).await?;
        return Ok(Json(ApiResponse::new(page)).into_response());
    }

    // File id
    let link = state.share_service().mint_link(&key).await?;
    let response = ShareLinkResponse {
        share_url: state.share_url(&link.link_id),
        download_url: state.download_url(&link.link_id),
        link_id: link.link_id,
        file_id: link.file_id,
    };
    Ok(Json(ApiResponse::new(response)).into_response())
}

/// POST /share/:key - Share page with a password or email attempt.
#[utoipa::path(
    post,
    path = "/share/{key}",
    tag = "share",
    params(
        ("key" = String, Path, description = "Link id")
    ),
    request_body = AccessRequest,
    responses(
        (status = 200, description = "Share page status", body = SharePageResponse),
        (status = 404, description = "Unknown link", body = ErrorBody),
        (status = 422, description = "Invalid credentials format", body = ErrorBody)
    )
)]
pub async fn post_share(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    ValidatedJson(request): ValidatedJson<AccessRequest>,
) -> Result<Json<ApiResponse<SharePageResponse>>, ApiError> {
    let page = share_page(&state, &key, request.into()).await?;
    Ok(Json(ApiResponse::new(page)))
}

async fn share_page(
    state: &AppState,
    token: &str,
    attempt: AccessAttempt,
) -> Result<SharePageResponse, ApiError> {
    let page = state.share_service().share_page(token, &attempt).await?;
    // None until the file has a link
    let download_url = page
        .link
        .as_ref()
        .map(|link| state.download_url(&link.link_id));
    Ok(SharePageResponse::new(&page.record, page.decision, download_url))
}
