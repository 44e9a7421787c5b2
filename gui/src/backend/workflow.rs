//! Backup and restore runs
//!
//! Runs execute on a blocking worker thread and report back through an
//! unbounded channel. `Reset` is always the last event of a run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;

use crate::backend::backup_file::{self, BackupWriter};
use crate::backend::descriptor;
use crate::backend::netsh::WlanTool;
use crate::backend::profiles;
use crate::config::AppConfig;
use crate::error::WifiBackupError;
use crate::models::profile::{BackupEntry, RestoreSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Backup,
    Restore,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Backup => f.write_str("Backing up"),
            Action::Restore => f.write_str("Restoring"),
        }
    }
}

/// Progress reported from a running workflow
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Log(String),
    Progress {
        action: Action,
        current: usize,
        total: usize,
    },
    /// Run over; progress back to zero and status back to idle
    Reset,
}

impl WorkflowEvent {
    /// Progress in percent, for `Progress` events.
    pub fn percent(&self) -> Option<f32> {
        match self {
            WorkflowEvent::Progress { current, total, .. } if *total > 0 => {
                Some(*current as f32 * 100.0 / *total as f32)
            }
            WorkflowEvent::Progress { .. } => Some(0.0),
            _ => None,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    BackupWritten { path: PathBuf, profiles: usize },
    NoProfiles,
    Restored(RestoreSummary),
    /// Unusable input; nothing was attempted
    Warning(String),
    Failed(String),
    Busy,
}

/// Admits a single run at a time.
#[derive(Debug, Clone, Default)]
pub struct RunLock {
    running: Arc<AtomicBool>,
}

impl RunLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn try_begin(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard {
                running: self.running.clone(),
            })
    }
}

/// Held for the duration of a run.
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Sends `Reset` when a run unwinds, on every exit path.
struct ResetOnDrop<'a>(&'a UnboundedSender<WorkflowEvent>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        let _ = self.0.send(WorkflowEvent::Reset);
    }
}

fn log(events: &UnboundedSender<WorkflowEvent>, message: impl Into<String>) {
    let _ = events.send(WorkflowEvent::Log(message.into()));
}

fn progress(events: &UnboundedSender<WorkflowEvent>, action: Action, current: usize, total: usize) {
    let _ = events.send(WorkflowEvent::Progress {
        action,
        current,
        total,
    });
}

/// Pre-flight check on a user-selected backup file.
pub fn check_backup_file(path: &Path) -> Result<(), WifiBackupError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WifiBackupError::MissingBackup(path.to_path_buf()))
        }
        Err(e) => return Err(WifiBackupError::filesystem("read", path, e)),
    };
    if metadata.len() == 0 {
        return Err(WifiBackupError::EmptyBackup);
    }
    Ok(())
}

/// Back up every saved profile into a new file in `config.backup_dir`.
///
/// Errors are logged and folded into the outcome.
pub fn backup_job(
    tool: &dyn WlanTool,
    config: &AppConfig,
    lock: &RunLock,
    events: &UnboundedSender<WorkflowEvent>,
) -> RunOutcome {
    let _reset = ResetOnDrop(events);
    let Some(_guard) = lock.try_begin() else {
        log(events, "A backup or restore is already running.");
        return RunOutcome::Busy;
    };

    match run_backup(tool, config, events) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Backup failed: {}", e);
            log(events, format!("Backup failed: {e}"));
            RunOutcome::Failed(e.to_string())
        }
    }
}

/// Enumerate, extract and stream each record to disk as it is read.
pub fn run_backup(
    tool: &dyn WlanTool,
    config: &AppConfig,
    events: &UnboundedSender<WorkflowEvent>,
) -> Result<RunOutcome, WifiBackupError> {
    let names = profiles::list_profiles(tool)?;
    if names.is_empty() {
        log(events, "No saved Wi-Fi profiles found.");
        return Ok(RunOutcome::NoProfiles);
    }

    let mut writer = BackupWriter::create_in(&config.backup_dir, Local::now())?;
    let total = names.len();

    for (index, name) in names.into_iter().enumerate() {
        log(events, format!("Backing up: {name}"));
        let credential = profiles::get_credential(tool, &name);
        if credential.is_sentinel() {
            log(events, format!("Could not read the key for {name}: {credential}"));
        }
        writer.write_entry(&BackupEntry::new(name, credential))?;
        progress(events, Action::Backup, index + 1, total);
    }

    let path = writer.finish()?;
    log(events, format!("Wi-Fi profiles backed up to: {}", path.display()));
    Ok(RunOutcome::BackupWritten {
        path,
        profiles: total,
    })
}

/// Restore every usable record from `backup`.
///
/// Errors are logged and folded into the outcome.
pub fn restore_job(
    tool: &dyn WlanTool,
    config: &AppConfig,
    backup: &Path,
    lock: &RunLock,
    events: &UnboundedSender<WorkflowEvent>,
) -> RunOutcome {
    let _reset = ResetOnDrop(events);
    let Some(_guard) = lock.try_begin() else {
        log(events, "A backup or restore is already running.");
        return RunOutcome::Busy;
    };

    match run_restore(tool, config, backup, events) {
        Ok(summary) => RunOutcome::Restored(summary),
        Err(e) if e.is_input_warning() => {
            tracing::warn!("Nothing to restore from {}: {}", backup.display(), e);
            log(events, format!("{e}"));
            RunOutcome::Warning(e.to_string())
        }
        Err(e) => {
            tracing::error!("Restore failed: {}", e);
            log(events, format!("Restore failed: {e}"));
            RunOutcome::Failed(e.to_string())
        }
    }
}

/// Parse `backup` and install each entry, pausing between attempts.
///
/// A failed install is counted, never fatal.
pub fn run_restore(
    tool: &dyn WlanTool,
    config: &AppConfig,
    backup: &Path,
    events: &UnboundedSender<WorkflowEvent>,
) -> Result<RestoreSummary, WifiBackupError> {
    let text = std::fs::read_to_string(backup)
        .map_err(|e| WifiBackupError::filesystem("read backup file", backup, e))?;
    let entries = backup_file::parse_backup(&text)?;

    let mut summary = RestoreSummary {
        total: entries.len(),
        ..RestoreSummary::default()
    };

    for (index, entry) in entries.iter().enumerate() {
        log(events, format!("Restoring ({}/{}): {}", index + 1, summary.total, entry.name));
        let key = entry.credential.key().unwrap_or_default();
        match descriptor::install_profile(tool, &config.temp_dir, &entry.name, key) {
            Ok(()) => {
                log(events, format!("✓ Restored: {}", entry.name));
                summary.restored += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to restore {}: {}", entry.name, e);
                log(events, format!("✗ Failed to restore {}: {}", entry.name, e));
                summary.failed += 1;
            }
        }
        progress(events, Action::Restore, index + 1, summary.total);

        if index + 1 < summary.total {
            std::thread::sleep(config.restore_delay());
        }
    }

    log(events, summary.to_string());
    Ok(summary)
}
