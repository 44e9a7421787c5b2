//! Error types for wifi-backup
//!
//! Per-profile failures are logged and counted by the workflow; only the
//! file-level variants abort a whole run.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WifiBackupError {
    /// netsh could not be started or reported failure
    #[error("netsh failed: {0}")]
    ExternalTool(String),

    #[error("backup file is empty")]
    EmptyBackup,

    #[error("no valid Wi-Fi profiles found in backup file")]
    NoValidEntries,

    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backup file does not exist: {}", .0.display())]
    MissingBackup(PathBuf),
}

impl WifiBackupError {
    pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Bad backup input is reported as a warning rather than an error.
    pub fn is_input_warning(&self) -> bool {
        matches!(self, Self::EmptyBackup | Self::NoValidEntries)
    }
}
