//! Share link repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::link::generate_link_id;
use crate::{FileShareError, Result};

/// Public token bound to exactly one file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShareLink {
    /// Link id (32 lowercase hex characters).
    pub link_id: String,
    /// ID of the linked file.
    pub file_id: String,
    /// When the link was minted.
    pub created_at: DateTime<Utc>,
}

/// Repository for share link operations.
pub struct ShareLinkRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ShareLinkRepository<'a> {
    /// Create a new ShareLinkRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a link by its id.
    pub async fn get_by_link_id(&self, link_id: &str) -> Result<Option<ShareLink>> {
        let link = sqlx::query_as::<_, ShareLink>(
            "SELECT link_id, file_id, created_at FROM share_links WHERE link_id = ?",
        )
        .bind(link_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(link)
    }

    /// Get the link for a file, if one has been minted.
    pub async fn get_link_for_file(&self, file_id: &str) -> Result<Option<ShareLink>> {
        let link = sqlx::query_as::<_, ShareLink>(
            "SELECT link_id, file_id, created_at FROM share_links WHERE file_id = ?",
        )
        .bind(file_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(link)
    }

    /// Insert a link. Fails if the file already has one or does not exist.
    pub async fn insert_link(&self, link_id: &str, file_id: &str) -> Result<ShareLink> {
        let link = sqlx::query_as::<_, ShareLink>(
            "INSERT INTO share_links (link_id, file_id, created_at) VALUES (?, ?, ?)
             RETURNING link_id, file_id, created_at",
        )
        .bind(link_id)
        .bind(file_id)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(link)
    }

    /// Return the file's link, minting one if absent.
    ///
    /// Concurrent callers for the same file converge on a single row: the
    /// insert is a no-op when a link already exists, and the row is read
    /// back afterwards.
    pub async fn get_or_create(&self, file_id: &str) -> Result<ShareLink> {
        sqlx::query(
            "INSERT INTO share_links (link_id, file_id, created_at) VALUES (?, ?, ?)
             ON CONFLICT(file_id) DO NOTHING",
        )
        .bind(generate_link_id())
        .bind(file_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        self.get_link_for_file(file_id)
            .await?
            .ok_or_else(|| FileShareError::NotFound("share link".to_string()))
    }

    /// Delete every link of a file. Returns the number of rows removed.
    pub async fn delete_links_for_file(&self, file_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM share_links WHERE file_id = ?")
            .bind(file_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
