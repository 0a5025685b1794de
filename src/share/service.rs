//! Share service: upload, link resolution and policy-gated serving.

use chrono::{DateTime, Utc};
use std::io;

use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::access::{evaluate, hash_password, AccessAttempt, Decision, DenyReason};
use crate::db::Database;
use crate::file::{
    is_link_id, parse_email_list, sanitize_filename, stored_name_for, ExtensionPolicy,
    FileRecord, FileRepository, FileStorage, NewFile, Privacy, ShareLink, ShareLinkRepository,
};
use crate::{FileShareError, Result};

use super::DEFAULT_MAX_FILE_SIZE;

/// Request data for an upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename as sent by the client.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// Privacy classification.
    pub privacy: Privacy,
    /// Expiry instant. `None` never expires.
    pub expire_date: Option<DateTime<Utc>>,
    /// Maximum number of downloads.
    pub download_limit: Option<i64>,
    /// Email allow-list text.
    pub allowed_emails: Option<String>,
    /// Plain-text download password.
    pub password: Option<String>,
}

impl UploadRequest {
    /// Create an unrestricted public upload.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
            privacy: Privacy::Public,
            expire_date: None,
            download_limit: None,
            allowed_emails: None,
            password: None,
        }
    }

    /// Set the privacy classification.
    pub fn with_privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }

    /// Set the expiry instant.
    pub fn with_expire_date(mut self, expire_date: DateTime<Utc>) -> Self {
        self.expire_date = Some(expire_date);
        self
    }

    /// Set the download limit.
    pub fn with_download_limit(mut self, limit: i64) -> Self {
        self.download_limit = Some(limit);
        self
    }

    /// Set the email allow-list.
    pub fn with_allowed_emails(mut self, emails: impl Into<String>) -> Self {
        self.allowed_emails = Some(emails.into());
        self
    }

    /// Set the download password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// A stored upload and its share link.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Created record.
    pub record: FileRecord,
    /// Link minted for the record.
    pub link: ShareLink,
}

/// Bytes released by a successful download or preview.
#[derive(Debug)]
pub struct ServedFile {
    /// File record. For downloads, `downloads` includes this one.
    pub record: FileRecord,
    /// File content.
    pub content: Vec<u8>,
}

/// Dry-run view of a shared file.
#[derive(Debug, Clone)]
pub struct SharePage {
    /// File record.
    pub record: FileRecord,
    /// The file's link, if one has been minted.
    pub link: Option<ShareLink>,
    /// What a download attempt with the same credentials would get.
    pub decision: Decision,
}

/// One entry of the management listing.
#[derive(Debug, Clone)]
pub struct ListedFile {
    /// File record.
    pub record: FileRecord,
    /// Link id, if minted.
    pub link_id: Option<String>,
    /// Whether the file has expired.
    pub is_expired: bool,
}

/// Service tying metadata, links, storage and the access policy together.
pub struct ShareService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
    extensions: ExtensionPolicy,
    max_file_size: u64,
}

impl<'a> ShareService<'a> {
    /// Create a new ShareService that accepts any extension.
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self {
            db,
            storage,
            extensions: ExtensionPolicy::new(["*"]),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Restrict uploads to the given extension policy.
    pub fn with_extension_policy(mut self, extensions: ExtensionPolicy) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// The active extension policy.
    pub fn extension_policy(&self) -> &ExtensionPolicy {
        &self.extensions
    }

    /// The maximum upload size in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Store an upload and mint its share link.
    ///
    /// # Validation
    /// - Filename: non-empty after sanitization
    /// - Extension: accepted by the extension policy
    /// - Size: at most the configured maximum
    /// - Download limit: not negative
    /// - Expiry: in the future
    /// - Allowed emails: every entry is an email address
    /// - Password: 1 to 128 characters when given
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome> {
        let original_name = sanitize_filename(&request.filename)
            .ok_or_else(|| FileShareError::Validation("No file selected".to_string()))?;

        if !self.extensions.is_allowed(&original_name) {
            return Err(FileShareError::UnsupportedFileType(original_name));
        }

        if request.content.len() as u64 > self.max_file_size {
            return Err(FileShareError::TooLarge {
                max_bytes: self.max_file_size,
            });
        }

        if let Some(limit) = request.download_limit {
            if limit < 0 {
                return Err(FileShareError::Validation(
                    "download_limit must not be negative".to_string(),
                ));
            }
        }

        if let Some(expire) = request.expire_date {
            if expire <= Utc::now() {
                return Err(FileShareError::Validation(
                    "expire_date must be in the future".to_string(),
                ));
            }
        }

        let allowed_emails = match request.allowed_emails.as_deref() {
            Some(text) => normalize_allowed_emails(text)?,
            None => None,
        };

        let password_hash = match request.password.as_deref() {
            Some("") | None => None,
            Some(password) => Some(hash_password(password)?),
        };

        let id = Uuid::new_v4().to_string();
        let stored_name = stored_name_for(&id, &original_name);
        let content_type = mime_guess::from_path(&original_name)
            .first_or_octet_stream()
            .to_string();

        let mut new_file = NewFile::new(
            &stored_name,
            &original_name,
            request.content.len() as i64,
            content_type,
        )
        .with_id(&id)
        .with_privacy(request.privacy);
        new_file.expire_date = request.expire_date;
        new_file.download_limit = request.download_limit;
        new_file.allowed_emails = allowed_emails;
        new_file.password_hash = password_hash;

        self.storage.save(&request.content, &stored_name).await?;

        let record = match FileRepository::new(self.db.pool()).insert(&new_file).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored_name).await {
                    warn!(stored_name = %stored_name, "failed to remove orphaned bytes: {}", cleanup);
                }
                return Err(e);
            }
        };

        let link = ShareLinkRepository::new(self.db.pool())
            .get_or_create(&record.id)
            .await?;

        info!(
            file_id = %record.id,
            stored_name = %record.stored_name,
            size = record.size,
            "file uploaded"
        );

        Ok(UploadOutcome { record, link })
    }

    /// Map a token to a file: link id first, then stored name.
    pub async fn resolve(&self, token: &str) -> Result<FileRecord> {
        let files = FileRepository::new(self.db.pool());

        if let Some(link) = ShareLinkRepository::new(self.db.pool())
            .get_by_link_id(token)
            .await?
        {
            if let Some(record) = files.get_by_id(&link.file_id).await? {
                return Ok(record);
            }
        }

        files
            .get_by_stored_name(token)
            .await?
            .ok_or_else(|| FileShareError::NotFound("file".to_string()))
    }

    /// Resolve, evaluate and serve a download.
    ///
    /// # Side Effects
    /// Increments the download count once, only when access is allowed.
    pub async fn download(&self, token: &str, attempt: &AccessAttempt) -> Result<ServedFile> {
        let mut record = self.resolve(token).await?;

        if let Decision::Deny(reason) = evaluate(&record, attempt, Utc::now()) {
            debug!(file_id = %record.id, %reason, "download denied");
            return Err(FileShareError::AccessDenied(reason));
        }

        // Read first so a missing blob never uses up a download.
        let content = self.load_content(&record).await?;

        let files = FileRepository::new(self.db.pool());
        match files.try_claim_download(&record.id).await? {
            Some(downloads) => record.downloads = downloads,
            None => {
                // Another request took the last download, or the file is gone.
                return match files.get_by_id(&record.id).await? {
                    Some(_) => Err(FileShareError::AccessDenied(
                        DenyReason::DownloadLimitExceeded,
                    )),
                    None => Err(FileShareError::NotFound("file".to_string())),
                };
            }
        }

        info!(
            file_id = %record.id,
            downloads = record.downloads,
            "file downloaded"
        );

        Ok(ServedFile { record, content })
    }

    /// Resolve and evaluate without serving or counting.
    pub async fn share_page(&self, token: &str, attempt: &AccessAttempt) -> Result<SharePage> {
        let record = self.resolve(token).await?;
        let link = ShareLinkRepository::new(self.db.pool())
            .get_link_for_file(&record.id)
            .await?;
        let decision = evaluate(&record, attempt, Utc::now());

        Ok(SharePage {
            record,
            link,
            decision,
        })
    }

    /// Serve a file for inline viewing.
    ///
    /// Gated by the same policy as downloads but not counted. Only
    /// previewable content types are served.
    pub async fn preview(&self, token: &str, attempt: &AccessAttempt) -> Result<ServedFile> {
        let record = self.resolve(token).await?;

        if let Decision::Deny(reason) = evaluate(&record, attempt, Utc::now()) {
            return Err(FileShareError::AccessDenied(reason));
        }

        if !is_previewable(&record.content_type) {
            return Err(FileShareError::UnsupportedFileType(
                record.content_type.clone(),
            ));
        }

        let content = self.load_content(&record).await?;
        Ok(ServedFile { record, content })
    }

    /// Read the bytes behind an existing record.
    ///
    /// A record whose blob is gone is a storage failure, not a missing file.
    async fn load_content(&self, record: &FileRecord) -> Result<Vec<u8>> {
        match self.storage.load(&record.stored_name).await {
            Err(FileShareError::NotFound(_)) => {
                error!(file_id = %record.id, stored_name = %record.stored_name, "stored bytes missing");
                Err(FileShareError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "stored bytes missing for existing record",
                )))
            }
            other => other,
        }
    }

    /// Return the file's share link, minting it on first request.
    pub async fn mint_link(&self, file_id: &str) -> Result<ShareLink> {
        let record = FileRepository::new(self.db.pool())
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| FileShareError::NotFound("file".to_string()))?;

        ShareLinkRepository::new(self.db.pool())
            .get_or_create(&record.id)
            .await
    }

    /// Delete a file by stored name, file id or link id.
    ///
    /// Removes links, the record and the bytes. Returns whether anything
    /// existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let files = FileRepository::new(self.db.pool());
        let links = ShareLinkRepository::new(self.db.pool());

        let mut record = files.get_by_stored_name(key).await?;
        if record.is_none() {
            record = files.get_by_id(key).await?;
        }
        if record.is_none() && is_link_id(key) {
            if let Some(link) = links.get_by_link_id(key).await? {
                record = files.get_by_id(&link.file_id).await?;
            }
        }

        let Some(record) = record else {
            // Bytes without a record are still removed.
            return match self.storage.delete(key).await {
                Ok(removed) => Ok(removed),
                Err(FileShareError::Validation(_)) => Ok(false),
                Err(e) => Err(e),
            };
        };

        links.delete_links_for_file(&record.id).await?;
        files.delete(&record.id).await?;
        let had_bytes = self.storage.delete(&record.stored_name).await?;
        if !had_bytes {
            warn!(stored_name = %record.stored_name, "deleted record had no stored bytes");
        }

        info!(file_id = %record.id, stored_name = %record.stored_name, "file deleted");
        Ok(true)
    }

    /// List files newest first, optionally filtered by privacy.
    pub async fn list(&self, privacy: Option<Privacy>) -> Result<Vec<ListedFile>> {
        let files = FileRepository::new(self.db.pool());
        let links = ShareLinkRepository::new(self.db.pool());

        let records = match privacy {
            Some(privacy) => files.list_by_privacy(privacy).await?,
            None => files.list_newest_first().await?,
        };

        let now = Utc::now();
        let mut listed = Vec::with_capacity(records.len());
        for record in records {
            let link_id = links
                .get_link_for_file(&record.id)
                .await?
                .map(|link| link.link_id);
            listed.push(ListedFile {
                is_expired: record.is_expired(now),
                link_id,
                record,
            });
        }

        Ok(listed)
    }
}

/// Types a browser would run as a document with script.
const ACTIVE_CONTENT_TYPES: &[&str] = &[
    "text/html",
    "application/xhtml+xml",
    "image/svg+xml",
    "text/xml",
    "application/xml",
    "text/xsl",
];

/// Whether a content type can be shown inline.
///
/// Markup that can carry script (HTML, XHTML, SVG, XML) is never previewable.
pub fn is_previewable(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if ACTIVE_CONTENT_TYPES.contains(&essence.as_str()) {
        return false;
    }
    ["image/", "text/", "audio/", "video/"]
        .iter()
        .any(|prefix| essence.starts_with(prefix))
        || essence == "application/pdf"
}

/// Validate allow-list text and store it as `a@x, b@y`.
fn normalize_allowed_emails(text: &str) -> Result<Option<String>> {
    let emails = parse_email_list(text);
    if emails.is_empty() {
        return Ok(None);
    }
    if let Some(bad) = emails.iter().find(|e| !e.validate_email()) {
        return Err(FileShareError::Validation(format!(
            "invalid email in allowed_emails: {bad}"
        )));
    }
    Ok(Some(emails.join(", ")))
}
