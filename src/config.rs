//! Configuration module for fileshare.

use serde::Deserialize;
use std::path::Path;

use crate::{FileShareError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL used when rendering share and download links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Timezone used to interpret expiry dates without an offset (e.g., "UTC", "Asia/Ho_Chi_Minh").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// CORS allowed origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Per-IP request limit for download, share and preview routes (requests per minute).
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_public_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_rate_limit() -> u32 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: default_public_base_url(),
            timezone: default_timezone(),
            cors_origins: vec![],
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/fileshare.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the upload directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Accepted file extensions (lowercase, without dot). `*` accepts anything.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "txt", "pdf", "doc", "docx", "jpg", "jpeg", "png", "gif", "zip", "rar", "mp4", "mp3",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty logs to the console only.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Append to the log file instead of truncating it at startup.
    #[serde(default = "default_true")]
    pub append: bool,
    /// Log one line per HTTP request and response.
    #[serde(default = "default_true")]
    pub http_trace: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/fileshare.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            append: true,
            http_trace: true,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FileShareError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FileShareError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILESHARE_PUBLIC_BASE_URL`: Override the public base URL
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FILESHARE_PUBLIC_BASE_URL") {
            if !url.is_empty() {
                self.server.public_base_url = url;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.max_upload_size_mb == 0 {
            return Err(FileShareError::Config(
                "files.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.files.allowed_extensions.is_empty() {
            return Err(FileShareError::Config(
                "files.allowed_extensions must not be empty (use \"*\" to accept anything)"
                    .to_string(),
            ));
        }
        if self.server.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(FileShareError::Config(format!(
                "unknown timezone: {}",
                self.server.timezone
            )));
        }
        if self.server.rate_limit_per_minute == 0 {
            return Err(FileShareError::Config(
                "server.rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.public_base_url, "http://localhost:5000");
        assert_eq!(config.server.timezone, "UTC");
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.rate_limit_per_minute, 120);

        assert_eq!(config.database.path, "data/fileshare.db");

        assert_eq!(config.files.storage_path, "uploads");
        assert_eq!(config.files.max_upload_size_mb, 10);
        assert_eq!(config.files.max_upload_bytes(), 10 * 1024 * 1024);
        assert!(config.files.allowed_extensions.contains(&"pdf".to_string()));
        assert_eq!(config.files.allowed_extensions.len(), 12);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/fileshare.log");
        assert!(config.logging.append);
        assert!(config.logging.http_trace);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
public_base_url = "https://files.example.com"
timezone = "Asia/Tokyo"
cors_origins = ["http://localhost:5173"]
rate_limit_per_minute = 30

[database]
path = "custom/db.sqlite"

[files]
storage_path = "custom/files"
max_upload_size_mb = 20
allowed_extensions = ["*"]

[logging]
level = "debug"
file = "custom/logs/app.log"
append = false
http_trace = false
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.public_base_url, "https://files.example.com");
        assert_eq!(config.server.timezone, "Asia/Tokyo");
        assert_eq!(config.server.cors_origins.len(), 1);
        assert_eq!(config.server.rate_limit_per_minute, 30);

        assert_eq!(config.database.path, "custom/db.sqlite");

        assert_eq!(config.files.storage_path, "custom/files");
        assert_eq!(config.files.max_upload_size_mb, 20);
        assert_eq!(config.files.allowed_extensions, vec!["*".to_string()]);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
        assert!(!config.logging.append);
        assert!(!config.logging.http_trace);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 3000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path, "data/fileshare.db");
        assert_eq!(config.files.max_upload_size_mb, 10);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.files.storage_path, "uploads");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(FileShareError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FileShareError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides_public_url() {
        let original = std::env::var("FILESHARE_PUBLIC_BASE_URL").ok();

        std::env::set_var("FILESHARE_PUBLIC_BASE_URL", "https://share.example.org");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.server.public_base_url, "https://share.example.org");

        std::env::set_var("FILESHARE_PUBLIC_BASE_URL", "");
        let mut config = Config::default();
        config.server.public_base_url = "https://kept.example.org".to_string();
        config.apply_env_overrides();
        assert_eq!(config.server.public_base_url, "https://kept.example.org");

        if let Some(val) = original {
            std::env::set_var("FILESHARE_PUBLIC_BASE_URL", val);
        } else {
            std::env::remove_var("FILESHARE_PUBLIC_BASE_URL");
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_upload_size() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;
        assert!(matches!(config.validate(), Err(FileShareError::Config(_))));
    }

    #[test]
    fn test_validate_empty_extensions() {
        let mut config = Config::default();
        config.files.allowed_extensions.clear();
        assert!(matches!(config.validate(), Err(FileShareError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_timezone() {
        let mut config = Config::default();
        config.server.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        if let Err(FileShareError::Config(msg)) = result {
            assert!(msg.contains("Mars/Olympus_Mons"));
        } else {
            panic!("Expected Config error");
        }
    }
}
