//! File metadata types and repository.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{FileShareError, Result};

/// Column list shared by every `files` query.
const FILE_COLUMNS: &str = "id, stored_name, original_name, size, content_type, privacy, \
     expire_date, download_limit, downloads, allowed_emails, password_hash, created_at";

/// Privacy classification of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    /// Included when the listing is filtered to `public`.
    #[default]
    Public,
    /// Left out of `public` listings. Still served to anyone holding its
    /// link or stored name; access rules come from the password, email and
    /// limit fields, not from this tag.
    Private,
}

impl Privacy {
    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            other => Err(format!("unknown privacy tag: {other}")),
        }
    }
}

impl TryFrom<String> for Privacy {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Metadata and access policy of one uploaded file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID (UUID v4).
    pub id: String,
    /// Name of the bytes inside the storage directory.
    pub stored_name: String,
    /// User-supplied display name, used for the attachment filename.
    pub original_name: String,
    /// File size in bytes.
    pub size: i64,
    /// MIME type guessed from the original name.
    pub content_type: String,
    /// Privacy classification.
    #[sqlx(try_from = "String")]
    pub privacy: Privacy,
    /// Expiry instant. `None` never expires.
    pub expire_date: Option<DateTime<Utc>>,
    /// Maximum number of downloads. `None` is unlimited.
    pub download_limit: Option<i64>,
    /// Number of successful downloads.
    pub downloads: i64,
    /// Email allow-list text.
    pub allowed_emails: Option<String>,
    /// Argon2 hash of the download password.
    pub password_hash: Option<String>,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Whether the expiry instant has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_date.map_or(false, |expire| now > expire)
    }

    /// Whether the download counter has reached the limit.
    pub fn is_limit_reached(&self) -> bool {
        self.download_limit
            .map_or(false, |limit| self.downloads >= limit)
    }

    /// Whether downloads require a password.
    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Parsed email allow-list (lowercase). Empty when unrestricted.
    pub fn allowed_email_list(&self) -> Vec<String> {
        self.allowed_emails
            .as_deref()
            .map(parse_email_list)
            .unwrap_or_default()
    }
}

/// Split free-text allow-list input into normalized addresses.
pub fn parse_email_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// File ID (UUID v4).
    pub id: String,
    /// Stored name.
    pub stored_name: String,
    /// Original name.
    pub original_name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub content_type: String,
    /// Privacy classification.
    pub privacy: Privacy,
    /// Expiry instant.
    pub expire_date: Option<DateTime<Utc>>,
    /// Download limit.
    pub download_limit: Option<i64>,
    /// Email allow-list text.
    pub allowed_emails: Option<String>,
    /// Password hash.
    pub password_hash: Option<String>,
}

impl NewFile {
    /// Create a new NewFile with a fresh ID and no access restrictions.
    pub fn new(
        stored_name: impl Into<String>,
        original_name: impl Into<String>,
        size: i64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stored_name: stored_name.into(),
            original_name: original_name.into(),
            size,
            content_type: content_type.into(),
            privacy: Privacy::Public,
            expire_date: None,
            download_limit: None,
            allowed_emails: None,
            password_hash: None,
        }
    }

    /// Use a specific ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
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

    /// Set the email allow-list text.
    pub fn with_allowed_emails(mut self, emails: impl Into<String>) -> Self {
        self.allowed_emails = Some(emails.into());
        self
    }

    /// Set the password hash.
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }
}

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record. `downloads` starts at 0.
    pub async fn insert(&self, file: &NewFile) -> Result<FileRecord> {
        sqlx::query(
            "INSERT INTO files (id, stored_name, original_name, size, content_type, privacy,
                                expire_date, download_limit, allowed_emails, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.id)
        .bind(&file.stored_name)
        .bind(&file.original_name)
        .bind(file.size)
        .bind(&file.content_type)
        .bind(file.privacy.as_str())
        .bind(file.expire_date)
        .bind(file.download_limit)
        .bind(&file.allowed_emails)
        .bind(&file.password_hash)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        self.get_by_id(&file.id)
            .await?
            .ok_or_else(|| FileShareError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Get a file by stored name.
    pub async fn get_by_stored_name(&self, stored_name: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE stored_name = ?"
        ))
        .bind(stored_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// List all files, newest first.
    pub async fn list_newest_first(&self) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// List files with the given privacy tag, newest first.
    pub async fn list_by_privacy(&self, privacy: Privacy) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE privacy = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(privacy.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// Increment the download counter unconditionally.
    ///
    /// Returns the new count, or `None` if the file does not exist.
    pub async fn increment_downloads(&self, id: &str) -> Result<Option<i64>> {
        let downloads: Option<i64> = sqlx::query_scalar(
            "UPDATE files SET downloads = downloads + 1 WHERE id = ? RETURNING downloads",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(downloads)
    }

    /// Increment the download counter only while it is below the limit.
    ///
    /// The check and the increment are one statement, so concurrent
    /// downloads can never push the counter past `download_limit`.
    /// Returns the new count, or `None` if the limit is reached or the
    /// file does not exist.
    pub async fn try_claim_download(&self, id: &str) -> Result<Option<i64>> {
        let downloads: Option<i64> = sqlx::query_scalar(
            "UPDATE files SET downloads = downloads + 1
             WHERE id = ? AND (download_limit IS NULL OR downloads < download_limit)
             RETURNING downloads",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(downloads)
    }

    /// Delete a file record by ID.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all files.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
