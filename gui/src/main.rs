mod cli;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use iced::clipboard;
use iced::widget::{column, container};
use iced::{Element, Length, Task};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing_subscriber::EnvFilter;

use wifi_backup::backend::workflow;
use wifi_backup::config::exe_dir;
use wifi_backup::{Action, AppConfig, Netsh, RunLock, RunOutcome, WorkflowEvent};
use ui::{output_panel, status_bar, toolbar};

const READY: &str = "Ready";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = AppConfig::load(args.config.as_deref());

    if let Some(command) = args.command {
        return cli::run(command, config);
    }

    let result = iced::application("WiFi Backup", WifiBackup::update, WifiBackup::view)
        .theme(|_| iced::Theme::Dark)
        .window_size(iced::Size::new(640.0, 460.0))
        .run_with(move || WifiBackup::new(config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("GUI exited with error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    // Toolbar actions
    Toolbar(toolbar::ToolbarMessage),
    // Log panel actions
    Output(output_panel::OutputMessage),
    RestoreFileSelected(Option<PathBuf>),
    // Worker results
    Workflow(WorkflowEvent),
    RunFinished(RunOutcome),
    DialogClosed,
}

struct WifiBackup {
    config: Arc<AppConfig>,
    tool: Arc<Netsh>,
    run_lock: RunLock,
    log_output: String,
    progress: f32,
    status: String,
    active: Option<Action>,
}

impl WifiBackup {
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        tracing::info!("Using {} for wlan commands", config.netsh_path.display());

        (
            WifiBackup {
                tool: Arc::new(Netsh::new(&config.netsh_path)),
                config: Arc::new(config),
                run_lock: RunLock::new(),
                log_output: String::new(),
                progress: 0.0,
                status: READY.to_string(),
                active: None,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Toolbar(toolbar::ToolbarMessage::Backup) => self.start_backup(),

            Message::Toolbar(toolbar::ToolbarMessage::Restore) => {
                if self.active.is_some() {
                    return Task::none();
                }
                Task::perform(pick_backup_file(), Message::RestoreFileSelected)
            }

            Message::RestoreFileSelected(None) => Task::none(),

            Message::RestoreFileSelected(Some(path)) => match workflow::check_backup_file(&path) {
                Ok(()) => self.start_restore(path),
                Err(e) => {
                    self.append_log(&e.to_string());
                    show_dialog(rfd::MessageLevel::Error, "Error", e.to_string())
                }
            },

            Message::Output(output_msg) => {
                match output_msg {
                    output_panel::OutputMessage::Copy => {
                        return clipboard::write(self.log_output.clone());
                    }
                    output_panel::OutputMessage::Clear => {
                        self.log_output.clear();
                    }
                }
                Task::none()
            }

            Message::Workflow(event) => {
                match &event {
                    WorkflowEvent::Log(line) => {
                        self.append_log(line);
                        return output_panel::follow();
                    }
                    WorkflowEvent::Progress { action, current, total } => {
                        self.progress = event.percent().unwrap_or_default();
                        self.status = format!("{action}... {current}/{total}");
                    }
                    WorkflowEvent::Reset => {
                        self.progress = 0.0;
                        self.status = READY.to_string();
                        self.active = None;
                    }
                }
                Task::none()
            }

            Message::RunFinished(outcome) => match outcome {
                RunOutcome::BackupWritten { path, profiles } => show_dialog(
                    rfd::MessageLevel::Info,
                    "Backup complete",
                    format!("Backed up {} Wi-Fi profiles to\n{}", profiles, path.display()),
                ),
                RunOutcome::Restored(summary) => {
                    show_dialog(rfd::MessageLevel::Info, "Restore complete", summary.to_string())
                }
                RunOutcome::Warning(message) => show_dialog(rfd::MessageLevel::Warning, "Warning", message),
                RunOutcome::Failed(message) => show_dialog(rfd::MessageLevel::Error, "Error", message),
                RunOutcome::NoProfiles | RunOutcome::Busy => Task::none(),
            },

            Message::DialogClosed => Task::none(),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let toolbar = toolbar::view(self.active.is_some()).map(Message::Toolbar);
        let status = status_bar::view(self.progress, &self.status);
        let output_panel = output_panel::view(&self.log_output).map(Message::Output);

        column![
            toolbar,
            status,
            container(output_panel)
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(10),
        ]
        .spacing(5)
        .into()
    }

    fn append_log(&mut self, line: &str) {
        self.log_output.push_str(line);
        self.log_output.push('\n');
    }

    fn start_backup(&mut self) -> Task<Message> {
        if !self.begin(Action::Backup) {
            return Task::none();
        }

        let tool = self.tool.clone();
        let config = self.config.clone();
        let lock = self.run_lock.clone();
        let (tx, rx) = unbounded_channel();

        let worker = Task::perform(
            async move {
                tokio::task::spawn_blocking(move || workflow::backup_job(&*tool, &config, &lock, &tx))
                    .await
                    .unwrap_or_else(|e| RunOutcome::Failed(format!("Backup worker failed: {e}")))
            },
            Message::RunFinished,
        );
        Task::batch([Task::run(UnboundedReceiverStream::new(rx), Message::Workflow), worker])
    }

    fn start_restore(&mut self, backup: PathBuf) -> Task<Message> {
        if !self.begin(Action::Restore) {
            return Task::none();
        }
        self.append_log(&format!("Selected backup file: {}", backup.display()));

        let tool = self.tool.clone();
        let config = self.config.clone();
        let lock = self.run_lock.clone();
        let (tx, rx) = unbounded_channel();

        let worker = Task::perform(
            async move {
                tokio::task::spawn_blocking(move || workflow::restore_job(&*tool, &config, &backup, &lock, &tx))
                    .await
                    .unwrap_or_else(|e| RunOutcome::Failed(format!("Restore worker failed: {e}")))
            },
            Message::RunFinished,
        );
        Task::batch([Task::run(UnboundedReceiverStream::new(rx), Message::Workflow), worker])
    }

    /// Mark a run as started; false if one is already active.
    fn begin(&mut self, action: Action) -> bool {
        if self.active.is_some() || self.run_lock.is_running() {
            self.append_log("A backup or restore is already running.");
            return false;
        }
        self.log_output.clear();
        self.active = Some(action);
        self.status = format!("{action}...");
        true
    }
}

async fn pick_backup_file() -> Option<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Select Wi-Fi backup file")
        .add_filter("Text files", &["txt"])
        .add_filter("All files", &["*"]);

    if let Some(dir) = exe_dir() {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file().await.map(|handle| handle.path().to_path_buf())
}

fn show_dialog(level: rfd::MessageLevel, title: &'static str, description: String) -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(level)
                .set_title(title)
                .set_description(description)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await
        },
        |_| Message::DialogClosed,
    )
}
