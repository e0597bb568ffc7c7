use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// Default configuration
pub const DEFAULT_API_URL: &str = "https://i.instagram.com/api/v1/";
pub const DEFAULT_USER_AGENT: &str =
    "Instagram 10.26.0 Android (18/4.3; 320dpi; 720x1280; Xiaomi; HM 1SW; armani; qcom; en_US)";
pub const WINDOW_TITLE: &str = "IG:dm - Instagram Desktop Messenger";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and how to reach the messenger API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Poll timing, in seconds
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PollingSettings {
    /// Interval while the window has focus
    pub active_secs: u64,
    /// Interval while the window is in the background
    pub idle_secs: u64,
    /// Delay before retrying a failed fetch
    pub backoff_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            active_secs: 10,
            idle_secs: 30,
            backoff_secs: 60,
        }
    }
}

impl PollingSettings {
    pub fn active(&self) -> Duration {
        Duration::from_secs(self.active_secs.max(1))
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs.max(1))
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs.max(1))
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub theme: String,
    /// Prefill for the login form. Never a password.
    #[serde(default)]
    pub last_username: String,
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "igdm", "igdm-client") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::warn!("Failed to create config dir: {}", e);
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

/// Load settings from the platform config dir, falling back to defaults.
pub fn load_settings() -> Settings {
    let Some(path) = settings_path() else {
        return Settings::default();
    };
    match load_settings_from(&path) {
        Ok(settings) => settings,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring unreadable settings: {}", e);
            Settings::default()
        }
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    let path = settings_path().ok_or(ConfigError::NoConfigDir)?;
    save_settings_to(&path, settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(settings)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}
