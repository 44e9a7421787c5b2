use std::fmt;

/// Written in place of a key when `netsh` failed for the profile.
pub const EXTRACTION_FAILED: &str = "extraction failed";
/// Written in place of a key when `netsh` printed no key line (open networks).
pub const NOT_FOUND: &str = "not found";

// Sentinels written by the older Chinese-language tool.
const LEGACY_EXTRACTION_FAILED: &str = "获取密码失败";
const LEGACY_NOT_FOUND: &str = "未找到密码";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Key(String),
    ExtractionFailed,
    NotFound,
}

impl Credential {
    /// Interpret a credential field read back from a backup file.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            EXTRACTION_FAILED | LEGACY_EXTRACTION_FAILED => Credential::ExtractionFailed,
            NOT_FOUND | LEGACY_NOT_FOUND => Credential::NotFound,
            key => Credential::Key(key.to_string()),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Credential::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.key().is_none()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Key(key) => f.write_str(key),
            Credential::ExtractionFailed => f.write_str(EXTRACTION_FAILED),
            Credential::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

/// One record of a backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub name: String,
    pub credential: Credential,
}

impl BackupEntry {
    pub fn new(name: impl Into<String>, credential: Credential) -> Self {
        Self {
            name: name.into(),
            credential,
        }
    }
}

/// Tally reported at the end of a restore run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub total: usize,
    pub restored: usize,
    pub failed: usize,
}

impl fmt::Display for RestoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wi-Fi restore finished.\nTotal: {}\nRestored: {}\nFailed: {}",
            self.total, self.restored, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_parse_back_to_their_variants() {
        assert_eq!(Credential::parse("extraction failed"), Credential::ExtractionFailed);
        assert_eq!(Credential::parse(" not found "), Credential::NotFound);
        assert_eq!(Credential::parse("获取密码失败"), Credential::ExtractionFailed);
        assert_eq!(Credential::parse("未找到密码"), Credential::NotFound);
    }

    #[test]
    fn real_keys_are_kept_trimmed() {
        let credential = Credential::parse("  secret123 ");
        assert_eq!(credential.key(), Some("secret123"));
        assert!(!credential.is_sentinel());
        assert_eq!(credential.to_string(), "secret123");
    }

    #[test]
    fn sentinel_display_matches_backup_text() {
        assert_eq!(Credential::ExtractionFailed.to_string(), EXTRACTION_FAILED);
        assert_eq!(Credential::NotFound.to_string(), NOT_FOUND);
        assert!(Credential::NotFound.is_sentinel());
    }
}
