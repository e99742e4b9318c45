//! Configuration types for logwise.
//!
//! [`Config::load`] reads `~/.config/logwise/config.toml`, creating it with
//! the built-in defaults if it does not yet exist. [`Config::defaults`]
//! returns the same defaults without touching the filesystem (useful in
//! tests).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::normalizer::{Normalizer, DEFAULT_SUMMARY_MAX_CHARS};
use crate::range::RangeKey;
use crate::types::Severity;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_CONFIG: &str = r#"
[backend]
base_url            = "http://localhost:8000"
timeout_secs        = 30
project_description = "Cloud application logs investigation"

[investigation]
default_range      = "last-24h"
default_severities = ["ERROR", "WARNING"]
summary_max_chars  = 80

[ui]
show_timestamps  = true
timestamp_format = "%H:%M:%S%.3f"
theme            = "default"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub investigation: InvestigationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[backend]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overall deadline for a single request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Context string sent with every explanation request.
    #[serde(default = "default_project_description")]
    pub project_description: String,
}

fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_project_description() -> String { "Cloud application logs investigation".to_string() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            project_description: default_project_description(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[investigation]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvestigationConfig {
    #[serde(default = "default_range")]
    pub default_range: RangeKey,
    /// Severities ticked when a new investigation opens. Empty means "all".
    #[serde(default = "default_severities")]
    pub default_severities: Vec<Severity>,
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

fn default_range() -> RangeKey { RangeKey::Last24h }
fn default_severities() -> Vec<Severity> { vec![Severity::Error, Severity::Warning] }
fn default_summary_max_chars() -> usize { DEFAULT_SUMMARY_MAX_CHARS }

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            default_range: default_range(),
            default_severities: default_severities(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

impl InvestigationConfig {
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.summary_max_chars)
    }
}

/// `[ui]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_show_timestamps() -> bool { true }
fn default_timestamp_format() -> String { "%H:%M:%S%.3f".to_string() }
fn default_theme() -> String { "default".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            timestamp_format: default_timestamp_format(),
            theme: default_theme(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/logwise/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path, layered on top of the built-in defaults.
    /// Creates the file with defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, DEFAULT_CONFIG.trim_start())?;
        }

        Ok(config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(false))
            .build()?
            .try_deserialize()?)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        Self {
            backend: BackendConfig::default(),
            investigation: InvestigationConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("logwise")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
