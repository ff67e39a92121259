use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::TimeDelta;
use tracing::trace;

use crate::alerts::DEFAULT_COOLDOWN_HOURS;
use crate::util;

/// Blob store configuration for the cooldown ledger
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence across restarts)
    #[serde(rename = "none")]
    None,

    /// A local directory
    File {
        #[serde(default = "default_state_path")]
        path: PathBuf,
    },

    /// An S3 bucket (default)
    S3 {
        #[serde(default = "default_bucket")]
        bucket: String,
        region: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::S3 {
            bucket: default_bucket(),
            region: None,
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./state")
}

fn default_bucket() -> String {
    util::get_state_bucket()
}

/// How alert emails are delivered
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierConfig {
    Ses { region: Option<String> },
    Webhook { url: String },
}

impl Default for NotifierConfig {
    fn default() -> Self {
        match util::get_webhook_url() {
            Some(url) => NotifierConfig::Webhook { url },
            None => NotifierConfig::Ses { region: None },
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_sampling_feature_code")]
    pub sampling_feature_code: String,
    /// Length of the trailing window requested on every cycle
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sampling_feature_code: default_sampling_feature_code(),
            window_minutes: default_window_minutes(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    /// Trailing window requested on every cycle
    pub fn window(&self) -> anyhow::Result<TimeDelta> {
        if self.window_minutes == 0 {
            bail!("window_minutes must be at least 1");
        }
        i64::try_from(self.window_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .with_context(|| format!("window_minutes {} is out of range", self.window_minutes))
    }
}

fn default_base_url() -> String {
    "https://monitormywatershed.org/dataloader/ajax/".to_string()
}

fn default_sampling_feature_code() -> String {
    "MSPL2S".to_string()
}

fn default_window_minutes() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    /// Seconds between cycles in continuous mode
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u64,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            interval_secs: default_interval(),
            cooldown_hours: default_cooldown_hours(),
            storage: StorageConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Config {
    /// Minimum time between two alerts for the same measurement
    pub fn cooldown(&self) -> anyhow::Result<TimeDelta> {
        if self.cooldown_hours == 0 {
            bail!("cooldown_hours must be at least 1");
        }
        i64::try_from(self.cooldown_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .with_context(|| format!("cooldown_hours {} is out of range", self.cooldown_hours))
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.cooldown()?;
        self.source.window()?;
        Ok(())
    }
}

fn default_interval() -> u64 {
    300
}

fn default_cooldown_hours() -> u64 {
    DEFAULT_COOLDOWN_HOURS as u64
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("could not read {path}"))?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    let config: Config =
        serde_json::from_str(content).context("Invalid configuration file provided!")?;
    config
        .validate()
        .context("Invalid configuration file provided!")?;
    trace!("loaded config: {config:?}");
    Ok(config)
}

/// Who receives alerts and who sends them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipients {
    pub recipient: Option<String>,
    pub sender: Option<String>,
}

impl Recipients {
    pub fn from_env() -> Self {
        Self {
            recipient: util::get_recipient(),
            sender: util::get_sender(),
        }
    }
}
