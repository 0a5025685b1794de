//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::access::DenyReason;
use crate::file::Privacy;
use crate::web::dto::{
    AccessRequest, DeleteResponse, FileListItem, FileListResponse, FileResponse,
    SharePageResponse, ShareLinkResponse, UploadConstraintsResponse, UploadForm, UploadResponse,
};
use crate::web::error::{ErrorBody, ErrorCode, ErrorDetail};
use crate::web::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Upload
        handlers::upload_constraints,
        handlers::upload_file,
        // Download
        handlers::list_files,
        handlers::download_file,
        handlers::download_file_with_credentials,
        handlers::preview_file,
        // Share
        handlers::get_share,
        handlers::post_share,
        // Manage
        handlers::delete_file,
    ),
    components(schemas(
        AccessRequest,
        UploadForm,
        FileResponse,
        UploadResponse,
        UploadConstraintsResponse,
        FileListItem,
        FileListResponse,
        ShareLinkResponse,
        SharePageResponse,
        DeleteResponse,
        Privacy,
        DenyReason,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "upload", description = "File upload"),
        (name = "download", description = "Listing, download and preview"),
        (name = "share", description = "Share links and share pages"),
        (name = "manage", description = "File deletion"),
    ),
    info(
        title = "fileshare API",
        description = "Upload files and share them through expiring, download-limited links"
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
