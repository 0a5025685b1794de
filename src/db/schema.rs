//! Database schema and migrations for fileshare.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: File metadata and access policy
    r#"
CREATE TABLE files (
    id              TEXT PRIMARY KEY,                  -- UUID v4
    stored_name     TEXT NOT NULL UNIQUE,              -- <uuid>.<ext> on disk
    original_name   TEXT NOT NULL,                     -- attachment filename
    size            INTEGER NOT NULL DEFAULT 0,
    content_type    TEXT NOT NULL DEFAULT 'application/octet-stream',
    privacy         TEXT NOT NULL DEFAULT 'public',    -- 'public', 'private'
    expire_date     TEXT,                              -- NULL = never expires
    download_limit  INTEGER CHECK (download_limit IS NULL OR download_limit >= 0),
    downloads       INTEGER NOT NULL DEFAULT 0,
    allowed_emails  TEXT,
    password_hash   TEXT,                              -- Argon2 hash
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_files_created_at ON files(created_at);
CREATE INDEX idx_files_privacy ON files(privacy);
"#,
    // v2: Share links, at most one per file
    r#"
CREATE TABLE share_links (
    link_id     TEXT PRIMARY KEY,
    file_id     TEXT NOT NULL UNIQUE REFERENCES files(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

CREATE INDEX idx_share_links_file_id ON share_links(file_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(
                migration.contains("CREATE TABLE")
                    || migration.contains("ALTER TABLE")
                    || migration.contains("CREATE INDEX")
            );
        }
    }

    #[test]
    fn test_files_migration_columns() {
        let files = MIGRATIONS[0];
        assert!(files.contains("CREATE TABLE files"));
        for column in [
            "stored_name",
            "original_name",
            "privacy",
            "expire_date",
            "download_limit",
            "downloads",
            "allowed_emails",
            "password_hash",
            "created_at",
        ] {
            assert!(files.contains(column), "missing column {column}");
        }
    }

    #[test]
    fn test_share_links_unique_per_file() {
        let links = MIGRATIONS[1];
        assert!(links.contains("CREATE TABLE share_links"));
        assert!(links.contains("file_id     TEXT NOT NULL UNIQUE"));
        assert!(links.contains("ON DELETE CASCADE"));
    }
}
