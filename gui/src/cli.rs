use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::unbounded_channel;

use wifi_backup::backend::workflow;
use wifi_backup::{AppConfig, Netsh, RunLock, RunOutcome, WorkflowEvent};

#[derive(Debug, Parser)]
#[command(name = "wifi-backup", version, about = "Back up and restore saved Wi-Fi profiles")]
pub struct Args {
    /// JSON config file. Defaults to wifi-backup.json next to the executable
    /// or in the working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run without a window. Starts the GUI when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write every saved profile and its key to a new backup file
    Backup {
        /// Directory for the backup file (overrides the config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Install the profiles stored in a backup file
    Restore {
        file: PathBuf,
    },
}

/// Run one workflow on a worker thread, printing its log as it goes.
pub fn run(command: Command, mut config: AppConfig) -> ExitCode {
    if let Command::Backup { out_dir: Some(dir) } = &command {
        config.backup_dir = dir.clone();
    }

    let tool = Netsh::new(&config.netsh_path);
    let lock = RunLock::new();
    let (tx, mut rx) = unbounded_channel();

    let worker = std::thread::spawn(move || match command {
        Command::Backup { .. } => workflow::backup_job(&tool, &config, &lock, &tx),
        Command::Restore { file } => match workflow::check_backup_file(&file) {
            Ok(()) => workflow::restore_job(&tool, &config, &file, &lock, &tx),
            Err(e) if e.is_input_warning() => RunOutcome::Warning(e.to_string()),
            Err(e) => RunOutcome::Failed(e.to_string()),
        },
    });

    // Ends once the worker drops its sender
    while let Some(event) = rx.blocking_recv() {
        match &event {
            WorkflowEvent::Log(line) => println!("{line}"),
            WorkflowEvent::Progress { action, current, total } => println!(
                "[{:>3.0}%] {action}... {current}/{total}",
                event.percent().unwrap_or_default()
            ),
            WorkflowEvent::Reset => {}
        }
    }

    let outcome = worker
        .join()
        .unwrap_or_else(|_| RunOutcome::Failed("worker thread panicked".to_string()));

    match outcome {
        RunOutcome::BackupWritten { .. } | RunOutcome::NoProfiles => ExitCode::SUCCESS,
        RunOutcome::Restored(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        RunOutcome::Restored(_) => ExitCode::FAILURE,
        RunOutcome::Warning(message) => {
            eprintln!("Warning: {message}");
            ExitCode::FAILURE
        }
        RunOutcome::Failed(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
        RunOutcome::Busy => ExitCode::FAILURE,
    }
}
