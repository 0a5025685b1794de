//! Access policy evaluation for downloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::password::{verify_password, PasswordError};
use crate::file::FileRecord;

/// Why a download attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The expiry instant has passed.
    ExpiredLink,
    /// The download counter reached the limit.
    DownloadLimitExceeded,
    /// The file has an email allow-list and the supplied email is not on it.
    EmailNotAllowed,
    /// The file is password protected and no password was supplied.
    PasswordRequired,
    /// The supplied password does not match.
    PasswordIncorrect,
}

impl DenyReason {
    /// Machine-readable tag, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::ExpiredLink => "expired_link",
            DenyReason::DownloadLimitExceeded => "download_limit_exceeded",
            DenyReason::EmailNotAllowed => "email_not_allowed",
            DenyReason::PasswordRequired => "password_required",
            DenyReason::PasswordIncorrect => "password_incorrect",
        }
    }

    /// Short human-readable message.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::ExpiredLink => "This link has expired",
            DenyReason::DownloadLimitExceeded => "Download limit reached",
            DenyReason::EmailNotAllowed => "Your email is not allowed to access this file",
            DenyReason::PasswordRequired => "A password is required to access this file",
            DenyReason::PasswordIncorrect => "Incorrect password",
        }
    }

    /// Whether a password prompt should be shown.
    pub fn is_password_related(&self) -> bool {
        matches!(
            self,
            DenyReason::PasswordRequired | DenyReason::PasswordIncorrect
        )
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating an access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The download may proceed.
    Allow,
    /// The download is refused.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the decision allows access.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The deny reason, if any.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// Credentials supplied with a download attempt.
#[derive(Debug, Clone, Default)]
pub struct AccessAttempt {
    /// Download password.
    pub password: Option<String>,
    /// Requester email, checked against the allow-list.
    pub email: Option<String>,
}

impl AccessAttempt {
    /// Attempt without credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build an attempt, treating blank values as absent.
    pub fn new(password: Option<String>, email: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
            email: email
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
        }
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Set the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        let email: String = email.into();
        self.email = Some(email.trim().to_lowercase()).filter(|e| !e.is_empty());
        self
    }
}

/// Decide whether `attempt` may download `record` at `now`.
///
/// Checks run in order and the first failure wins: expiry, download limit,
/// email allow-list, password. Expiry and limit come first so that an
/// expired or exhausted file reveals nothing about its credentials.
pub fn evaluate(record: &FileRecord, attempt: &AccessAttempt, now: DateTime<Utc>) -> Decision {
    if record.is_expired(now) {
        return Decision::Deny(DenyReason::ExpiredLink);
    }

    if record.is_limit_reached() {
        return Decision::Deny(DenyReason::DownloadLimitExceeded);
    }

    let allowed = record.allowed_email_list();
    if !allowed.is_empty() {
        let listed = attempt
            .email
            .as_deref()
            .map_or(false, |email| allowed.iter().any(|a| a == email));
        if !listed {
            return Decision::Deny(DenyReason::EmailNotAllowed);
        }
    }

    if let Some(hash) = record.password_hash.as_deref() {
        let Some(password) = attempt.password.as_deref() else {
            return Decision::Deny(DenyReason::PasswordRequired);
        };
        match verify_password(password, hash) {
            Ok(()) => {}
            Err(PasswordError::VerificationFailed) => {
                return Decision::Deny(DenyReason::PasswordIncorrect);
            }
            Err(e) => {
                warn!(file_id = %record.id, "stored password hash unusable: {}", e);
                return Decision::Deny(DenyReason::PasswordIncorrect);
            }
        }
    }

    Decision::Allow
}
