//! Backup and restore of saved Wi-Fi profiles.
//!
//! The backend drives `netsh wlan`, parses its output and reads/writes the
//! plain-text backup format. The GUI and CLI in `main.rs` are thin shells
//! over [`backend::workflow`].

pub mod backend;
pub mod config;
pub mod error;
pub mod models;

pub use backend::backup_file::{parse_backup, write_backup};
pub use backend::netsh::{Netsh, ToolOutput, WlanTool};
pub use backend::workflow::{Action, RunLock, RunOutcome, WorkflowEvent};
pub use config::AppConfig;
pub use error::WifiBackupError;
pub use models::profile::{BackupEntry, Credential, RestoreSummary};
