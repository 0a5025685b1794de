//! Access control for shared files.
//!
//! This module provides:
//! - The download policy evaluator (expiry, limit, email allow-list, password)
//! - Download password hashing with Argon2id

mod password;
mod policy;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use policy::{evaluate, AccessAttempt, Decision, DenyReason};
