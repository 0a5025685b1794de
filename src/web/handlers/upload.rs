//! Upload handlers.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::datetime::parse_expire_date;
use crate::file::Privacy;
use crate::share::UploadRequest;
use crate::web::dto::{
    ApiResponse, FileResponse, UploadConstraintsResponse, UploadForm, UploadResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Map a multipart read failure, keeping the body-limit case visible.
fn multipart_error(e: MultipartError, max_bytes: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::too_large(format!("file too large (max {max_bytes} bytes)"));
    }
    tracing::warn!("Failed to read multipart field: {}", e);
    ApiError::bad_request("Invalid multipart data")
}

/// Treat blank form values as absent.
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// GET /upload - Upload constraints.
#[utoipa::path(
    get,
    path = "/upload",
    tag = "upload",
    responses(
        (status = 200, description = "Accepted extensions and size limit", body = UploadConstraintsResponse)
    )
)]
pub async fn upload_constraints(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<UploadConstraintsResponse>> {
    Json(ApiResponse::new(UploadConstraintsResponse {
        allowed_extensions: state.extensions.extensions(),
        max_upload_size: state.max_upload_size,
    }))
}

/// POST /upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and optional
/// policy fields.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "Invalid input or no file selected"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Extension not allowed")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut privacy: Option<String> = None;
    let mut expire_date: Option<String> = None;
    let mut download_limit: Option<String> = None;
    let mut allowed_emails: Option<String> = None;
    let mut password: Option<String> = None;

    let max = state.max_upload_size;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = Some(field.file_name().unwrap_or("").to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error(e, max))?
                        .to_vec(),
                );
            }
            "password" => {
                // Passwords are taken verbatim, only empty means none
                let value = field.text().await.map_err(|e| multipart_error(e, max))?;
                password = Some(value).filter(|v| !v.is_empty());
            }
            "privacy" => {
                privacy = non_empty(field.text().await.map_err(|e| multipart_error(e, max))?);
            }
            "expire_date" => {
                expire_date = non_empty(field.text().await.map_err(|e| multipart_error(e, max))?);
            }
            "download_limit" => {
                download_limit =
                    non_empty(field.text().await.map_err(|e| multipart_error(e, max))?);
            }
            "allowed_emails" => {
                allowed_emails =
                    non_empty(field.text().await.map_err(|e| multipart_error(e, max))?);
            }
            // Unknown fields are ignored
            _ => {}
        }
    }

    let (Some(filename), Some(content)) = (filename, content) else {
        return Err(ApiError::bad_request("No file selected"));
    };

    let privacy = match privacy {
        Some(tag) => tag.parse::<Privacy>().map_err(ApiError::bad_request)?,
        None => Privacy::Public,
    };

    let expire_date = match expire_date {
        Some(text) => parse_expire_date(&text, &state.timezone)?,
        None => None,
    };

    let download_limit = match download_limit {
        Some(text) => Some(
            text.parse::<i64>()
                .map_err(|_| ApiError::bad_request("download_limit must be an integer"))?,
        ),
        None => None,
    };

    let request = UploadRequest {
        filename,
        content,
        privacy,
        expire_date,
        download_limit,
        allowed_emails,
        password,
    };

    let outcome = state.share_service().upload(request).await?;

    let response = UploadResponse {
        file: FileResponse::from_record(&outcome.record, Utc::now()),
        share_url: state.share_url(&outcome.link.link_id),
        download_url: state.download_url(&outcome.link.link_id),
        link_id: outcome.link.link_id,
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}
