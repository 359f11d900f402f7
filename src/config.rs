//! Scout configuration: TOML file defaults, overridden by CLI flags

use crate::cli::Cli;
use crate::error::{Result as ScoutResult, ScoutError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_ORIGIN: &str = "https://www.facebook.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub engine: EngineConfig,
    pub browser: BrowserConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

impl ScoutConfig {
    /// Load from a TOML file, or fall back to defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.headed {
            self.browser.headless = false;
        }
        if let Some(level) = cli.log_level.clone() {
            self.logging.level = level;
        }
        if let Some(output) = &cli.output {
            self.output.results_path = output.clone();
        }
    }
}

/// Which form of an extracted link is used for de-duplication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupKey {
    /// Absolute URL after joining relative hrefs onto the origin
    #[default]
    Normalized,
    /// The href attribute exactly as it appeared in the page
    Raw,
}

/// Scroll loop and extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Origin that search URLs are built on and relative hrefs are joined to
    pub origin: String,
    /// Period of the scroll/extract tick (milliseconds)
    pub tick_interval_ms: u64,
    /// Wait after navigation before the scroll loop is armed (milliseconds)
    pub settle_delay_ms: u64,
    /// Pixels scrolled per tick
    pub scroll_step_px: u32,
    /// Consecutive unchanged-height ticks before a back-off is signalled
    pub stagnation_threshold: u32,
    pub dedup_key: DedupKey,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            tick_interval_ms: 2000,
            settle_delay_ms: 3000,
            scroll_step_px: 300,
            stagnation_threshold: 5,
            dedup_key: DedupKey::Normalized,
        }
    }
}

impl EngineConfig {
    pub fn origin_url(&self) -> ScoutResult<Url> {
        Url::parse(&self.origin)
            .map_err(|e| ScoutError::Config(format!("invalid origin `{}`: {}", self.origin, e)))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Headless Chrome launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// How long Chrome may sit without CDP traffic before it is considered dead
    pub idle_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 900,
            idle_timeout_secs: 600,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log severity level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("discovered_entities.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ScoutConfig::from_toml(
            r#"
            [engine]
            tick_interval_ms = 500
            dedup_key = "raw"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.engine.dedup_key, DedupKey::Raw);
        assert_eq!(config.engine.settle_delay_ms, 3000);
        assert_eq!(config.engine.scroll_step_px, 300);
        assert_eq!(config.engine.stagnation_threshold, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.browser.headless);
    }

    #[test]
    fn unknown_dedup_key_is_rejected() {
        assert!(ScoutConfig::from_toml("[engine]\ndedup_key = \"fuzzy\"\n").is_err());
    }

    #[test]
    fn invalid_origin_is_a_config_error() {
        let engine = EngineConfig {
            origin: "not a url".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(engine.origin_url(), Err(ScoutError::Config(_))));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let cli = Cli::parse_from([
            "lead-scout",
            "--term",
            "acme",
            "--headed",
            "--log-level",
            "debug",
            "--output",
            "out.json",
        ]);
        let mut config = ScoutConfig::default();
        config.apply_cli(&cli);

        assert!(!config.browser.headless);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.output.results_path, PathBuf::from("out.json"));
    }
}
