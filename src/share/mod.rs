//! Share module for fileshare.
//!
//! High-level operations on shared files:
//! - Upload with validation and link minting
//! - Policy-gated download, preview and share page
//! - Listing and deletion

mod service;

pub use service::{
    is_previewable, ListedFile, ServedFile, SharePage, ShareService, UploadOutcome, UploadRequest,
};

/// Default maximum upload size (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
