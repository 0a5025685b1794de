//! fileshare - File sharing with expiring, download-limited share links.
//!
//! Files are uploaded once and handed out through opaque links. Each file
//! may carry an expiry date, a download limit, an email allow-list and a
//! password; every download is checked against them.

pub mod access;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod share;
pub mod web;

pub use access::{evaluate, AccessAttempt, Decision, DenyReason};
pub use config::Config;
pub use db::Database;
pub use error::{FileShareError, Result};
pub use file::{FileRecord, FileStorage, Privacy, ShareLink};
pub use share::ShareService;
