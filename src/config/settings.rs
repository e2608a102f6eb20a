use crate::search::models::DEFAULT_MODEL;
use crate::search::ReasoningEffort;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key; `--api-key` and `OPENAI_API_KEY` take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Optional custom API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Default model identifier
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub reasoning_effort: ReasoningEffort,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: default_model(),
            reasoning_effort: ReasoningEffort::Low,
            timeout_secs: None,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Apply `LOG_LEVEL`, `LOG_FORMAT` and `LOG_DIR` overrides
    ///
    /// `lookup` is normally `std::env::var(..).ok()`; tests pass a map.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            self.log.level = level.trim().to_lowercase();
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            match format.trim().to_lowercase().as_str() {
                "json" => self.log.format = LogFormat::Json,
                "text" => self.log.format = LogFormat::Text,
                other => tracing::warn!(value = %other, "ignoring unknown LOG_FORMAT"),
            }
        }
        if let Some(dir) = lookup("LOG_DIR").filter(|v| !v.trim().is_empty()) {
            let dir = if dir.ends_with(std::path::MAIN_SEPARATOR) {
                dir
            } else {
                format!("{dir}{}", std::path::MAIN_SEPARATOR)
            };
            self.log.file = true;
            self.log.path = Some(dir);
        }
        self
    }
}

/// Logging settings (`[log]` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level for this crate's file log (`trace` .. `error`)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Write a log file in addition to console output
    #[serde(default)]
    pub file: bool,

    /// Log file or directory; defaults to `websearch.log` next to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Rotated files to keep (0 keeps everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep: Option<usize>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
            file: false,
            path: None,
            rotation: LogRotation::Session,
            keep: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log file rotation strategy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Single append-only file
    None,
    /// One file per day
    Daily,
    /// One file per process run
    #[default]
    Session,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
