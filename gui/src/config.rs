use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "wifi-backup.json";

pub const ENV_NETSH: &str = "WIFI_BACKUP_NETSH";
pub const ENV_BACKUP_DIR: &str = "WIFI_BACKUP_DIR";
pub const ENV_TEMP_DIR: &str = "WIFI_BACKUP_TEMP_DIR";
pub const ENV_RESTORE_DELAY_MS: &str = "WIFI_BACKUP_RESTORE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Program invoked for every `wlan` command
    pub netsh_path: PathBuf,
    /// Directory new backup files are written to
    pub backup_dir: PathBuf,
    /// Directory for the short-lived profile descriptors
    pub temp_dir: PathBuf,
    /// Pause between two restore attempts
    pub restore_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            netsh_path: PathBuf::from("netsh"),
            backup_dir: PathBuf::from("."),
            temp_dir: std::env::temp_dir(),
            restore_delay_ms: 100,
        }
    }
}

impl AppConfig {
    /// Build the effective configuration.
    ///
    /// Resolution order, later steps winning:
    /// 1. Built-in defaults
    /// 2. `explicit` config file, or `wifi-backup.json` next to the executable,
    ///    or `wifi-backup.json` in the current working directory
    /// 3. `WIFI_BACKUP_*` environment variables
    pub fn load(explicit: Option<&Path>) -> Self {
        let mut config = match explicit.map(Path::to_path_buf).or_else(find_config_file) {
            Some(path) => Self::from_file(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let config = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(netsh) = lookup(ENV_NETSH) {
            self.netsh_path = PathBuf::from(netsh);
        }
        if let Some(dir) = lookup(ENV_BACKUP_DIR) {
            self.backup_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_TEMP_DIR) {
            self.temp_dir = PathBuf::from(dir);
        }
        if let Some(delay) = lookup(ENV_RESTORE_DELAY_MS) {
            match delay.trim().parse() {
                Ok(ms) => self.restore_delay_ms = ms,
                Err(_) => tracing::warn!("{} is not a number of milliseconds: {}", ENV_RESTORE_DELAY_MS, delay),
            }
        }
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}

/// Directory containing the running executable, if it can be determined.
pub fn exe_dir() -> Option<PathBuf> {
    let mut path = std::env::current_exe().ok()?;
    path.pop();
    Some(path)
}

fn find_config_file() -> Option<PathBuf> {
    let beside_exe = exe_dir().map(|dir| dir.join(CONFIG_FILE_NAME));
    let in_cwd = std::env::current_dir().ok().map(|dir| dir.join(CONFIG_FILE_NAME));

    [beside_exe, in_cwd].into_iter().flatten().find(|path| path.exists())
}
