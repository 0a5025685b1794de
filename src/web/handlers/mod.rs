//! HTTP handlers.

pub mod download;
pub mod manage;
pub mod preview;
pub mod share;
pub mod upload;

pub use download::*;
pub use manage::*;
pub use preview::*;
pub use share::*;
pub use upload::*;

use axum::{body::Body, http::header, response::Response};

use crate::config::Config;
use crate::db::Database;
use crate::file::{ExtensionPolicy, FileStorage};
use crate::share::{ServedFile, ShareService};
use crate::web::error::ApiError;

/// Shared application state.
pub struct AppState {
    /// Metadata database.
    pub db: Database,
    /// Byte storage.
    pub storage: FileStorage,
    /// Accepted upload extensions.
    pub extensions: ExtensionPolicy,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Base URL used in share and download links.
    pub public_base_url: String,
    /// Timezone for naive expiry input.
    pub timezone: String,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(db: Database, storage: FileStorage, config: &Config) -> Self {
        Self {
            db,
            storage,
            extensions: ExtensionPolicy::new(&config.files.allowed_extensions),
            max_upload_size: config.files.max_upload_bytes(),
            public_base_url: config
                .server
                .public_base_url
                .trim_end_matches('/')
                .to_string(),
            timezone: config.server.timezone.clone(),
        }
    }

    /// Share service bound to this state.
    pub fn share_service(&self) -> ShareService<'_> {
        ShareService::new(&self.db, &self.storage)
            .with_extension_policy(self.extensions.clone())
            .with_max_file_size(self.max_upload_size)
    }

    /// Public share page URL for a link.
    pub fn share_url(&self, link_id: &str) -> String {
        format!("{}/share/{}", self.public_base_url, link_id)
    }

    /// Direct download URL for a link.
    pub fn download_url(&self, link_id: &str) -> String {
        format!("{}/download/{}", self.public_base_url, link_id)
    }
}

/// Content-Disposition value for `filename`.
///
/// Control characters are removed (no header injection), quotes and
/// backslashes are replaced in the ASCII fallback, and non-ASCII names get
/// an RFC 5987 `filename*` parameter.
pub(crate) fn content_disposition_header(disposition: &str, filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\')
    {
        return format!("{disposition}; filename=\"{filename}\"");
    }

    let encoded = urlencoding::encode(filename);
    format!("{disposition}; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

/// Policy on served file bytes: no script, no outbound loads.
pub(crate) const FILE_CONTENT_SECURITY_POLICY: &str =
    "default-src 'none'; img-src 'self'; media-src 'self'; object-src 'self'; style-src 'unsafe-inline'";

/// Build a byte response for a served file.
pub(crate) fn file_response(served: ServedFile, disposition: &str) -> Result<Response, ApiError> {
    let ServedFile { record, content } = served;

    Response::builder()
        .header(header::CONTENT_TYPE, record.content_type.as_str())
        .header(header::CONTENT_SECURITY_POLICY, FILE_CONTENT_SECURITY_POLICY)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, &record.original_name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition_header("attachment", "report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            content_disposition_header("inline", "photo.png"),
            "inline; filename=\"photo.png\""
        );
    }

    #[test]
    fn test_content_disposition_unicode() {
        let value = content_disposition_header("attachment", "日本語.txt");
        assert!(value.starts_with("attachment; filename=\"___.txt\""));
        assert!(value.contains("filename*=UTF-8''%E6%97%A5%E6%9C%AC%E8%AA%9E.txt"));
    }

    #[test]
    fn test_content_disposition_injection() {
        let value = content_disposition_header("attachment", "evil\r\nSet-Cookie: x.txt");
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));

        let value = content_disposition_header("attachment", "a\"b.txt");
        assert!(value.contains("filename=\"a_b.txt\""));
    }

    #[test]
    fn test_file_response_forbids_script() {
        let served = ServedFile {
            record: crate::file::FileRecord {
                id: "id-1".to_string(),
                stored_name: "id-1.png".to_string(),
                original_name: "photo.png".to_string(),
                size: 3,
                content_type: "image/png".to_string(),
                privacy: crate::file::Privacy::Public,
                expire_date: None,
                download_limit: None,
                downloads: 0,
                allowed_emails: None,
                password_hash: None,
                created_at: chrono::Utc::now(),
            },
            content: b"png".to_vec(),
        };

        let response = file_response(served, "inline").unwrap();
        let csp = response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.starts_with("default-src 'none'"));
        assert!(!csp.contains("script-src"));
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "inline; filename=\"photo.png\""
        );
    }

    #[tokio::test]
    async fn test_app_state_urls() {
        let mut config = Config::default();
        config.server.public_base_url = "https://files.example.org/".to_string();
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let db = Database::open_in_memory().await.unwrap();

        let state = AppState::new(db, storage, &config);
        assert_eq!(
            state.share_url("abc"),
            "https://files.example.org/share/abc"
        );
        assert_eq!(
            state.download_url("abc"),
            "https://files.example.org/download/abc"
        );
        assert_eq!(state.max_upload_size, 10 * 1024 * 1024);
    }
}
