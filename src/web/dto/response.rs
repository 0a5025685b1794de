//! Response DTOs for the HTTP surface.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::access::{Decision, DenyReason};
use crate::datetime::to_rfc3339;
use crate::file::{FileRecord, Privacy};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// File metadata as exposed over HTTP. Never includes the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    /// File ID.
    pub id: String,
    /// Stored name.
    pub stored_name: String,
    /// Original filename.
    pub original_name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub content_type: String,
    /// Privacy classification.
    pub privacy: Privacy,
    /// Expiry (RFC 3339). Absent when the file never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<String>,
    /// Download limit. Absent when unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<i64>,
    /// Successful downloads so far.
    pub downloads: i64,
    /// Whether a password is required.
    pub password_protected: bool,
    /// Whether downloads are restricted to listed emails.
    pub email_restricted: bool,
    /// Whether the file has expired.
    pub is_expired: bool,
    /// Upload timestamp (RFC 3339).
    pub created_at: String,
}

impl FileResponse {
    /// Build from a record, evaluating expiry at `now`.
    pub fn from_record(record: &FileRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            stored_name: record.stored_name.clone(),
            original_name: record.original_name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            privacy: record.privacy,
            expire_date: record.expire_date.as_ref().map(to_rfc3339),
            download_limit: record.download_limit,
            downloads: record.downloads,
            password_protected: record.is_password_protected(),
            email_restricted: !record.allowed_email_list().is_empty(),
            is_expired: record.is_expired(now),
            created_at: to_rfc3339(&record.created_at),
        }
    }
}

/// Upload result.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Created file.
    pub file: FileResponse,
    /// Link id.
    pub link_id: String,
    /// Public share page URL.
    pub share_url: String,
    /// Direct download URL.
    pub download_url: String,
}

/// Upload constraints.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadConstraintsResponse {
    /// Accepted extensions (`*` accepts anything).
    pub allowed_extensions: Vec<String>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

/// Entry of the file listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileListItem {
    /// File metadata.
    #[serde(flatten)]
    pub file: FileResponse,
    /// Share page URL, when a link has been minted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
}

/// File listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    /// Files, newest first.
    pub files: Vec<FileListItem>,
    /// Number of files returned.
    pub total: usize,
}

/// A file's share link.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShareLinkResponse {
    /// Link id.
    pub link_id: String,
    /// Linked file ID.
    pub file_id: String,
    /// Public share page URL.
    pub share_url: String,
    /// Direct download URL.
    pub download_url: String,
}

/// Share page status.
#[derive(Debug, Serialize, ToSchema)]
pub struct SharePageResponse {
    /// Original filename.
    pub original_name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub content_type: String,
    /// Expiry (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<String>,
    /// Remaining downloads, when limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads_remaining: Option<i64>,
    /// Whether a download with the same credentials would succeed.
    pub allowed: bool,
    /// Why it would not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    /// Human-readable status.
    pub message: String,
    /// Whether to prompt for a password.
    pub password_required: bool,
    /// Direct download URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl SharePageResponse {
    /// Build from a record and a dry-run decision.
    pub fn new(record: &FileRecord, decision: Decision, download_url: Option<String>) -> Self {
        let reason = decision.reason();
        Self {
            original_name: record.original_name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            expire_date: record.expire_date.as_ref().map(to_rfc3339),
            downloads_remaining: record
                .download_limit
                .map(|limit| (limit - record.downloads).max(0)),
            allowed: decision.is_allowed(),
            reason,
            message: reason
                .map(|r| r.message())
                .unwrap_or("Ready to download")
                .to_string(),
            password_required: reason.map_or(false, |r| r.is_password_related()),
            download_url,
        }
    }
}

/// Deletion result.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Whether anything was deleted.
    pub deleted: bool,
    /// Human-readable result.
    pub message: String,
}
