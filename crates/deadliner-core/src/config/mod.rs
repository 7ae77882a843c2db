mod defaults;

#[cfg(test)]
mod tests;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DeadlinerError;
use defaults::*;

/// Environment variable that supplies the bot token when the config leaves it empty.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level Deadliner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deadliner: GeneralConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// SQLite store config. `:memory:` opens a private in-memory database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Telegram notification gateway config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
}

/// Reminder scheduling and delivery config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Run the reminder worker on `start`.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Max jobs claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// IANA timezone used to render deadlines.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Allowed drift between a job's scheduled time and the task deadline.
    #[serde(default = "default_fire_tolerance")]
    pub fire_tolerance_secs: u64,
    /// Drop the job handle when the gateway fails (no automatic retry).
    #[serde(default = "default_true")]
    pub clear_handle_on_failure: bool,
    /// Put jobs left `running` by a crashed worker back in the queue on start.
    #[serde(default = "default_true")]
    pub requeue_interrupted: bool,
    /// How long finished and cancelled jobs are kept before the worker
    /// purges them.
    #[serde(default = "default_job_retention")]
    pub job_retention_hours: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval(),
            batch_size: default_batch_size(),
            timezone: default_timezone(),
            language: default_language(),
            fire_tolerance_secs: default_fire_tolerance(),
            clear_handle_on_failure: true,
            requeue_interrupted: true,
            job_retention_hours: default_job_retention(),
        }
    }
}

impl ReminderConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz, DeadlinerError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| DeadlinerError::Config(format!("invalid timezone '{}': {e}", self.timezone)))
    }
}

impl TelegramConfig {
    /// Fill an empty bot token from the environment.
    pub fn resolve_token(&mut self) {
        if self.bot_token.is_empty() {
            if let Ok(token) = std::env::var(TELEGRAM_TOKEN_ENV) {
                self.bot_token = token;
            }
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. The reminder timezone
/// is validated here so a typo fails at startup rather than at fire time.
pub fn load(path: &str) -> Result<Config, DeadlinerError> {
    let path = Path::new(path);
    let mut config = if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeadlinerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str::<Config>(&content)
            .map_err(|e| DeadlinerError::Config(format!("failed to parse config: {}", e)))?
    };

    config.telegram.resolve_token();
    config.reminders.tz()?;

    Ok(config)
}
