//! Request DTOs for the HTTP surface.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::access::AccessAttempt;

/// Credentials supplied in the query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Download password.
    #[serde(default)]
    pub password: Option<String>,
    /// Requester email.
    #[serde(default)]
    pub email: Option<String>,
}

impl From<AccessQuery> for AccessAttempt {
    fn from(query: AccessQuery) -> Self {
        AccessAttempt::new(query.password, query.email)
    }
}

/// Credentials supplied as a JSON body.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AccessRequest {
    /// Download password.
    #[serde(default)]
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: Option<String>,
    /// Requester email.
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

impl From<AccessRequest> for AccessAttempt {
    fn from(request: AccessRequest) -> Self {
        AccessAttempt::new(request.password, request.email)
    }
}

/// Filter for the file listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `public` or `private`.
    #[serde(default)]
    pub privacy: Option<String>,
}

/// Multipart upload form (documentation only).
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// File content.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// `public` (default) or `private`.
    pub privacy: Option<String>,
    /// Expiry: empty or `never`, RFC 3339, `YYYY-MM-DDTHH:MM`, or `YYYY-MM-DD`.
    pub expire_date: Option<String>,
    /// Maximum number of downloads.
    pub download_limit: Option<i64>,
    /// Allowed emails, separated by commas, semicolons or whitespace.
    pub allowed_emails: Option<String>,
    /// Download password.
    pub password: Option<String>,
}
