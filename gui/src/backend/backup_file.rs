//! Plain-text backup format
//!
//! ```text
//! Name: HomeWiFi
//! Credential: secret123
//! ------------------------------
//! ```
//!
//! Records repeat with no header or escaping. Files written by the older
//! Chinese-language tool (`WiFi名称:` / `密码:`) are read as well.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::error::WifiBackupError;
use crate::models::profile::{BackupEntry, Credential};

pub const NAME_LABEL: &str = "Name:";
pub const CREDENTIAL_LABEL: &str = "Credential:";
pub const SEPARATOR_WIDTH: usize = 30;

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

fn record_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*(?:Name|WiFi名称):").expect("record start pattern"))
}

fn record() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A[ \t]*(?:Name|WiFi名称): ?(?P<name>[^\n]*)\n[ \t]*(?:Credential|密码): ?(?P<credential>.*)\z")
            .expect("record pattern")
    })
}

/// Render one record, separator line included.
pub fn render_entry(entry: &BackupEntry) -> String {
    format!(
        "{NAME_LABEL} {}\n{CREDENTIAL_LABEL} {}\n{}\n",
        entry.name,
        entry.credential,
        separator()
    )
}

/// `WiFi_Backup_<YYYYmmdd_HHMMSS>.txt`
pub fn backup_file_name(now: DateTime<Local>) -> String {
    format!("WiFi_Backup_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Streams records to a freshly created backup file.
pub struct BackupWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl BackupWriter {
    /// Create a new timestamped backup file in `dir`.
    ///
    /// An existing file of the same name is never overwritten; a numeric
    /// suffix is appended instead.
    pub fn create_in(dir: &Path, now: DateTime<Local>) -> Result<Self, WifiBackupError> {
        let file_name = backup_file_name(now);
        let stem = file_name.trim_end_matches(".txt");

        let mut attempt = 0;
        loop {
            let path = if attempt == 0 {
                dir.join(&file_name)
            } else {
                dir.join(format!("{stem}_{attempt}.txt"))
            };
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok(Self::with_file(path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempt < 100 => attempt += 1,
                Err(e) => return Err(WifiBackupError::filesystem("create backup file", path, e)),
            }
        }
    }

    /// Create (or truncate) a backup file at an exact path.
    pub fn create(path: &Path) -> Result<Self, WifiBackupError> {
        let file = File::create(path)
            .map_err(|e| WifiBackupError::filesystem("create backup file", path, e))?;
        Ok(Self::with_file(path.to_path_buf(), file))
    }

    fn with_file(path: PathBuf, file: File) -> Self {
        tracing::debug!("Writing backup to {}", path.display());
        Self {
            path,
            out: BufWriter::new(file),
            written: 0,
        }
    }

    pub fn write_entry(&mut self, entry: &BackupEntry) -> Result<(), WifiBackupError> {
        self.out
            .write_all(render_entry(entry).as_bytes())
            .map_err(|e| WifiBackupError::filesystem("write backup file", &self.path, e))?;
        self.written += 1;
        Ok(())
    }

    /// Flush and close the file, returning its absolute path.
    pub fn finish(mut self) -> Result<PathBuf, WifiBackupError> {
        self.out
            .flush()
            .map_err(|e| WifiBackupError::filesystem("write backup file", &self.path, e))?;
        tracing::info!("Wrote {} records to {}", self.written, self.path.display());
        Ok(std::path::absolute(&self.path).unwrap_or(self.path))
    }
}

/// Write `entries` to `path` in order and return the absolute path written.
///
/// Library entry point for callers that already hold every entry. The
/// backup workflow streams through [`BackupWriter::create_in`] instead.
pub fn write_backup<'a>(
    path: &Path,
    entries: impl IntoIterator<Item = &'a BackupEntry>,
) -> Result<PathBuf, WifiBackupError> {
    let mut writer = BackupWriter::create(path)?;
    for entry in entries {
        writer.write_entry(entry)?;
    }
    writer.finish()
}

/// Credential block minus a trailing separator line.
fn strip_separator(block: &str) -> &str {
    let block = block.trim_end();
    match block.rsplit_once('\n') {
        Some((head, last)) if is_separator(last) => head.trim(),
        _ => block.trim(),
    }
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '-')
}

/// Every record in `text`, sentinels included, in file order.
///
/// Labels may be indented, and a leading byte-order mark is ignored.
pub fn parse_records(text: &str) -> Vec<BackupEntry> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let starts: Vec<usize> = record_start().find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let caps = record().captures(&text[start..end])?;
            Some(BackupEntry::new(
                caps["name"].trim(),
                Credential::parse(strip_separator(&caps["credential"])),
            ))
        })
        .collect()
}

/// Records worth restoring.
///
/// Entries with an empty name or a sentinel credential are dropped silently.
pub fn parse_backup(text: &str) -> Result<Vec<BackupEntry>, WifiBackupError> {
    if text.trim_start_matches('\u{FEFF}').trim().is_empty() {
        return Err(WifiBackupError::EmptyBackup);
    }

    let entries: Vec<BackupEntry> = parse_records(text)
        .into_iter()
        .filter(|entry| !entry.name.is_empty() && !entry.credential.is_sentinel())
        .collect();

    if entries.is_empty() {
        return Err(WifiBackupError::NoValidEntries);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(name: &str, key: &str) -> BackupEntry {
        BackupEntry::new(name, Credential::Key(key.to_string()))
    }

    #[test]
    fn renders_three_line_record() {
        assert_eq!(
            render_entry(&key("HomeWiFi", "secret123")),
            "Name: HomeWiFi\nCredential: secret123\n------------------------------\n"
        );
        assert_eq!(
            render_entry(&BackupEntry::new("OfficeNet", Credential::ExtractionFailed)),
            "Name: OfficeNet\nCredential: extraction failed\n------------------------------\n"
        );
    }

    #[test]
    fn rendered_records_parse_back() {
        let entries = vec![
            key("HomeWiFi", "secret123"),
            key("Office Net 5G", "p@ss: word"),
            key("家里的网络", "12345678"),
        ];
        let text: String = entries.iter().map(render_entry).collect();

        assert_eq!(parse_backup(&text).unwrap(), entries);
    }

    #[test]
    fn separator_is_not_part_of_the_credential() {
        let text = "Name: A\nCredential: one\n------------------------------\nName: B\nCredential: two\n------------------------------\n";
        let entries = parse_backup(text).unwrap();
        assert_eq!(entries[0].credential.key(), Some("one"));
        assert_eq!(entries[1].credential.key(), Some("two"));
    }

    #[test]
    fn sentinels_and_blank_names_are_dropped() {
        let text = [
            key("HomeWiFi", "secret123"),
            BackupEntry::new("OfficeNet", Credential::ExtractionFailed),
            BackupEntry::new("Guest", Credential::NotFound),
            key("   ", "orphan"),
        ]
        .iter()
        .map(render_entry)
        .collect::<String>();

        assert_eq!(parse_backup(&text).unwrap(), vec![key("HomeWiFi", "secret123")]);
        assert_eq!(parse_records(&text).len(), 4);
    }

    #[test]
    fn legacy_chinese_backup_is_read() {
        let text = "WiFi名称: 家里的网络\n密码: 12345678\n------------------------------\nWiFi名称: 公司\n密码: 获取密码失败\n------------------------------\n";
        assert_eq!(parse_backup(text).unwrap(), vec![key("家里的网络", "12345678")]);
    }

    #[test]
    fn crlf_files_are_tolerated() {
        let text = "Name: HomeWiFi\r\nCredential: secret123\r\n------------------------------\r\n";
        assert_eq!(parse_backup(text).unwrap(), vec![key("HomeWiFi", "secret123")]);
    }

    #[test]
    fn byte_order_mark_does_not_hide_the_first_record() {
        let text = format!(
            "\u{FEFF}{}{}",
            render_entry(&key("HomeWiFi", "secret123")),
            render_entry(&key("Cafe", "latte1234"))
        );
        assert_eq!(
            parse_backup(&text).unwrap(),
            vec![key("HomeWiFi", "secret123"), key("Cafe", "latte1234")]
        );
        assert!(matches!(parse_backup("\u{FEFF}\n"), Err(WifiBackupError::EmptyBackup)));
    }

    #[test]
    fn indented_labels_are_accepted() {
        let text = "  Name: HomeWiFi\n  Credential: secret123\n  ------------------------------\n\tName: Cafe\n\tCredential: latte1234\n";
        assert_eq!(
            parse_backup(text).unwrap(),
            vec![key("HomeWiFi", "secret123"), key("Cafe", "latte1234")]
        );
    }

    #[test]
    fn empty_and_useless_inputs() {
        assert!(matches!(parse_backup(" \n\t"), Err(WifiBackupError::EmptyBackup)));
        assert!(matches!(
            parse_backup("just some notes\n"),
            Err(WifiBackupError::NoValidEntries)
        ));
        assert!(matches!(
            parse_backup("Name: Guest\nCredential: not found\n------------------------------\n"),
            Err(WifiBackupError::NoValidEntries)
        ));
    }

    #[test]
    fn file_name_uses_local_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(backup_file_name(now), "WiFi_Backup_20240309_070501.txt");
    }

    #[test]
    fn writer_never_overwrites_an_existing_backup() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        let first = BackupWriter::create_in(dir.path(), now).unwrap().finish().unwrap();
        let second = BackupWriter::create_in(dir.path(), now).unwrap().finish().unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("WiFi_Backup_20240309_070501_1.txt"));
        assert!(first.is_absolute());
    }

    #[test]
    fn write_backup_returns_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let entries = [key("HomeWiFi", "secret123")];

        let written = write_backup(&path, &entries).unwrap();
        assert!(written.is_absolute());
        assert_eq!(
            std::fs::read_to_string(&written).unwrap(),
            "Name: HomeWiFi\nCredential: secret123\n------------------------------\n"
        );
    }
}
