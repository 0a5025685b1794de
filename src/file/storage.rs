//! Byte storage for uploaded files.
//!
//! Files are stored under their stored name in a directory sharded by the
//! first two characters of that name.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::{FileShareError, Result};

/// File storage service for managing physical files.
///
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.pdf
/// ├── cd/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890.png
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write content under the given stored name, replacing nothing.
    ///
    /// Fails if a file with the same name already exists.
    pub async fn save(&self, content: &[u8], stored_name: &str) -> Result<()> {
        let file_path = self.get_file_path(stored_name)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, content).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        debug!(stored_name, bytes = content.len(), "stored file");
        Ok(())
    }

    /// Load content from storage.
    pub async fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::read(&file_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FileShareError::NotFound(format!("stored file {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a file from storage.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub async fn delete(&self, stored_name: &str) -> Result<bool> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => {
                if let Some(shard) = file_path.parent() {
                    // Only succeeds when the shard is empty.
                    let _ = fs::remove_dir(shard).await;
                }
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, stored_name: &str) -> bool {
        match self.get_file_path(stored_name) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Get the full file path for a stored name.
    ///
    /// The path is `{base_path}/{shard}/{stored_name}`. Names that could
    /// escape the base directory are rejected.
    pub fn get_file_path(&self, stored_name: &str) -> Result<PathBuf> {
        if !is_safe_stored_name(stored_name) {
            return Err(FileShareError::Validation(format!(
                "invalid stored name: {stored_name}"
            )));
        }
        Ok(self
            .base_path
            .join(Self::get_shard(stored_name))
            .join(stored_name))
    }

    /// First two characters of the stored name.
    fn get_shard(stored_name: &str) -> &str {
        match stored_name.char_indices().nth(2) {
            Some((idx, _)) => &stored_name[..idx],
            None => stored_name,
        }
    }
}

/// A stored name is a single path component made of ASCII alphanumerics,
/// `-`, `_` and `.`, not starting with a dot.
fn is_safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
