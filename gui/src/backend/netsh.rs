use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::backend::decode::decode_output;
use crate::error::WifiBackupError;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Raw result of one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
}

impl ToolOutput {
    pub fn stdout_text(&self) -> String {
        decode_output(&self.stdout)
    }

    pub fn stderr_text(&self) -> String {
        decode_output(&self.stderr)
    }

    /// Best available diagnostic: stderr, falling back to stdout since
    /// netsh prints most of its errors there.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr_text();
        if stderr.trim().is_empty() {
            self.stdout_text().trim().to_string()
        } else {
            stderr.trim().to_string()
        }
    }
}

/// The three `wlan` commands the workflows need.
///
/// Calls block until the subprocess exits; callers run them on a worker thread.
pub trait WlanTool: Send + Sync {
    /// `show profiles`
    fn show_profiles(&self) -> Result<ToolOutput, WifiBackupError>;

    /// `show profile name=<name> key=clear`
    fn show_profile_key(&self, name: &str) -> Result<ToolOutput, WifiBackupError>;

    /// `add profile filename=<descriptor>`
    fn add_profile(&self, descriptor: &Path) -> Result<ToolOutput, WifiBackupError>;
}

/// [`WlanTool`] backed by the real `netsh` executable.
#[derive(Debug, Clone)]
pub struct Netsh {
    program: PathBuf,
}

impl Netsh {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<ToolOutput, WifiBackupError> {
        tracing::debug!("Running {} {:?}", self.program.display(), args);

        let mut command = Command::new(&self.program);
        command
            .arg("wlan")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let output = command.output().map_err(|e| {
            WifiBackupError::ExternalTool(format!("failed to start {}: {}", self.program.display(), e))
        })?;

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
        })
    }
}

impl WlanTool for Netsh {
    fn show_profiles(&self) -> Result<ToolOutput, WifiBackupError> {
        self.run(vec!["show".into(), "profiles".into()])
    }

    fn show_profile_key(&self, name: &str) -> Result<ToolOutput, WifiBackupError> {
        // One argument, never a shell string, so names with spaces survive.
        self.run(vec![
            "show".into(),
            "profile".into(),
            format!("name={name}").into(),
            "key=clear".into(),
        ])
    }

    fn add_profile(&self, descriptor: &Path) -> Result<ToolOutput, WifiBackupError> {
        let mut filename = OsString::from("filename=");
        filename.push(descriptor.as_os_str());
        self.run(vec!["add".into(), "profile".into(), filename])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = ToolOutput {
            stdout: b"ignored".to_vec(),
            stderr: b"  access denied \r\n".to_vec(),
            success: false,
        };
        assert_eq!(output.diagnostic(), "access denied");
    }

    #[test]
    fn diagnostic_falls_back_to_stdout() {
        let output = ToolOutput {
            stdout: b"Profile \"Cafe\" is not found on the system.\r\n".to_vec(),
            stderr: Vec::new(),
            success: false,
        };
        assert_eq!(output.diagnostic(), "Profile \"Cafe\" is not found on the system.");
    }

    #[test]
    fn missing_program_is_an_external_tool_error() {
        let tool = Netsh::new("definitely-not-a-real-netsh-binary");
        let err = tool.show_profiles().unwrap_err();
        assert!(matches!(err, WifiBackupError::ExternalTool(_)));
    }
}
