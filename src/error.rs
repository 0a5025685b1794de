//! Error types for fileshare.

use thiserror::Error;

/// Common error type for fileshare.
#[derive(Error, Debug)]
pub enum FileShareError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The uploaded file type is not accepted.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The access policy refused the attempt.
    #[error("access denied: {0}")]
    AccessDenied(crate::access::DenyReason),

    /// Upload body exceeds the configured ceiling.
    #[error("file too large (max {max_bytes} bytes)")]
    TooLarge {
        /// Configured maximum in bytes.
        max_bytes: u64,
    },

    /// Password hashing error.
    #[error("password error: {0}")]
    Password(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FileShareError {
    fn from(e: sqlx::Error) -> Self {
        FileShareError::Database(e.to_string())
    }
}

impl From<crate::access::PasswordError> for FileShareError {
    fn from(e: crate::access::PasswordError) -> Self {
        FileShareError::Password(e.to_string())
    }
}

/// Result type alias for fileshare operations.
pub type Result<T> = std::result::Result<T, FileShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = FileShareError::Validation("download_limit must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "validation error: download_limit must be positive"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let err = FileShareError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_unsupported_file_type_display() {
        let err = FileShareError::UnsupportedFileType("exe".to_string());
        assert_eq!(err.to_string(), "unsupported file type: exe");
    }

    #[test]
    fn test_too_large_display() {
        let err = FileShareError::TooLarge { max_bytes: 1024 };
        assert_eq!(err.to_string(), "file too large (max 1024 bytes)");
    }

    #[test]
    fn test_access_denied_display() {
        let err = FileShareError::AccessDenied(crate::access::DenyReason::ExpiredLink);
        assert_eq!(err.to_string(), "access denied: expired_link");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FileShareError = io_err.into();
        assert!(matches!(err, FileShareError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: FileShareError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, FileShareError::Database(_)));
    }
}
