//! File management handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, DeleteResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /delete/:key - Delete a file by stored name, file ID or link id.
///
/// Deleting something that does not exist is not an error; the response
/// says so instead.
#[utoipa::path(
    get,
    path = "/delete/{key}",
    tag = "manage",
    params(
        ("key" = String, Path, description = "Stored name, file ID or link id")
    ),
    responses(
        (status = 200, description = "Deletion result", body = DeleteResponse)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let deleted = state.share_service().delete(&key).await?;

    let message = if deleted {
        "File deleted"
    } else {
        "File not found"
    };

    Ok(Json(ApiResponse::new(DeleteResponse {
        deleted,
        message: message.to_string(),
    })))
}
