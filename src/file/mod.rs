//! File module for fileshare.
//!
//! This module provides:
//! - File metadata records and their repository
//! - Share links and their repository
//! - Link id generation
//! - Filename sanitization and extension policy
//! - Physical byte storage

mod link;
mod metadata;
mod naming;
mod share_link;
mod storage;

pub use link::{generate_link_id, is_link_id, LINK_ID_LEN};
pub use metadata::{parse_email_list, FileRecord, FileRepository, NewFile, Privacy};
pub use naming::{
    extract_extension, sanitize_filename, stored_name_for, ExtensionPolicy, FALLBACK_EXTENSION,
};
pub use share_link::{ShareLink, ShareLinkRepository};
pub use storage::FileStorage;
