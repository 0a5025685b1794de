//! Filename handling: display-name sanitization, extension policy and
//! stored-name derivation.

use std::collections::HashSet;
use std::path::Path;

/// Extension used when the original name has none.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Maximum length of a sanitized display name, in characters.
const MAX_NAME_CHARS: usize = 255;

/// Clean a user-supplied filename for display and attachment naming.
///
/// Only the last path component is kept, control characters and the
/// characters `/ \ : * ? " < > |` are replaced with `_`, and surrounding
/// whitespace and dots are trimmed. Returns `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = last
        .chars()
        .map(|c| match c {
            c if c.is_control() => '_',
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .take(MAX_NAME_CHARS)
        .collect();

    let trimmed = cleaned.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercase extension of a filename, if it has one.
///
/// `.hidden` has no extension; `archive.tar.gz` has `gz`.
pub fn extract_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

/// Stored name for a file id: `<id>.<ext>`.
///
/// Only ASCII alphanumeric extensions are carried over, so the stored
/// name never contains user-controlled path characters.
pub fn stored_name_for(id: &str, original_name: &str) -> String {
    let ext = extract_extension(original_name)
        .filter(|e| e.len() <= 16 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{id}.{ext}")
}

/// Allowed upload extensions.
#[derive(Debug, Clone)]
pub struct ExtensionPolicy {
    allow_all: bool,
    allowed: HashSet<String>,
}

impl ExtensionPolicy {
    /// Build a policy from configured extensions. `*` accepts anything.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allow_all = false;
        let mut allowed = HashSet::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if ext == "*" {
                allow_all = true;
            } else if !ext.is_empty() {
                allowed.insert(ext);
            }
        }
        Self { allow_all, allowed }
    }

    /// Whether this policy accepts every extension.
    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Check a filename against the policy.
    pub fn is_allowed(&self, filename: &str) -> bool {
        if self.allow_all {
            return true;
        }
        extract_extension(filename).map_or(false, |ext| self.allowed.contains(&ext))
    }

    /// Allowed extensions, sorted (`*` when everything is accepted).
    pub fn extensions(&self) -> Vec<String> {
        if self.allow_all {
            return vec!["*".to_string()];
        }
        let mut list: Vec<String> = self.allowed.iter().cloned().collect();
        list.sort();
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\report.pdf").as_deref(),
            Some("report.pdf")
        );
    }

    #[test]
    fn test_sanitize_replaces_special_chars() {
        assert_eq!(
            sanitize_filename("a<b>:c?.txt").as_deref(),
            Some("a_b__c_.txt")
        );
        assert_eq!(
            sanitize_filename("line\nbreak.txt").as_deref(),
            Some("line_break.txt")
        );
    }

    #[test]
    fn test_sanitize_keeps_unicode() {
        assert_eq!(
            sanitize_filename("日本語ファイル.txt").as_deref(),
            Some("日本語ファイル.txt")
        );
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("   "), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("dir/"), None);
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(extract_extension("test.txt").as_deref(), Some("txt"));
        assert_eq!(extract_extension("document.PDF").as_deref(), Some("pdf"));
        assert_eq!(extract_extension("file.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extract_extension("no_ext"), None);
        assert_eq!(extract_extension(".hidden"), None);
    }

    #[test]
    fn test_stored_name_for() {
        assert_eq!(stored_name_for("abc", "report.PDF"), "abc.pdf");
        assert_eq!(stored_name_for("abc", "noext"), "abc.bin");
        assert_eq!(stored_name_for("abc", "weird.p$f"), "abc.bin");
    }

    #[test]
    fn test_extension_policy() {
        let policy = ExtensionPolicy::new(["pdf", ".PNG", " txt "]);
        assert!(policy.is_allowed("report.pdf"));
        assert!(policy.is_allowed("image.png"));
        assert!(policy.is_allowed("notes.TXT"));
        assert!(!policy.is_allowed("virus.exe"));
        assert!(!policy.is_allowed("noext"));
        assert!(!policy.allows_all());
        assert_eq!(policy.extensions(), vec!["pdf", "png", "txt"]);
    }

    #[test]
    fn test_extension_policy_wildcard() {
        let policy = ExtensionPolicy::new(["pdf", "*"]);
        assert!(policy.allows_all());
        assert!(policy.is_allowed("anything.exe"));
        assert!(policy.is_allowed("noext"));
        assert_eq!(policy.extensions(), vec!["*"]);
    }
}
