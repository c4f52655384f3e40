//! Configuration file parser for ~/.config/rssfeed/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one
//! since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FieldRules, DEFAULT_FETCH_TIMEOUT, MAX_FIELD_LENGTH};
use crate::poll::{PollOptions, DEFAULT_POLL_CONCURRENCY, MAX_ENTRIES_PER_POLL};

/// Default number of entries shown by `rssfeed recent`
pub const DEFAULT_RECENT_ENTRIES: usize = 10;

const KNOWN_KEYS: [&str; 8] = [
    "database_path",
    "max_entries_per_poll",
    "max_field_length",
    "fetch_timeout_secs",
    "scrape_summary_images",
    "poll_concurrency",
    "recent_entries",
    "user_agent",
];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file. `None` uses `rssfeed.db` in the config directory.
    pub database_path: Option<PathBuf>,

    /// Entries processed per poll; later ones wait for the feed to rotate.
    pub max_entries_per_poll: usize,

    /// Column cap for titles and image URLs, in characters.
    pub max_field_length: usize,

    pub fetch_timeout_secs: u64,

    /// Fall back to scraping an image URL from the entry summary.
    pub scrape_summary_images: bool,

    /// Feeds polled at once by `poll-all`.
    pub poll_concurrency: usize,

    /// Entries listed by `recent` when `-n` is not given.
    pub recent_entries: usize,

    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            max_entries_per_poll: MAX_ENTRIES_PER_POLL,
            max_field_length: MAX_FIELD_LENGTH,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            scrape_summary_images: true,
            poll_concurrency: DEFAULT_POLL_CONCURRENCY,
            recent_entries: DEFAULT_RECENT_ENTRIES,
            user_agent: concat!("rssfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Zero counts or timeout → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("max_entries_per_poll", self.max_entries_per_poll as u64),
            ("max_field_length", self.max_field_length as u64),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
            ("poll_concurrency", self.poll_concurrency as u64),
            ("recent_entries", self.recent_entries as u64),
        ];
        for (key, value) in counts {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Poll settings derived from this config.
    pub fn poll_options(&self, verbose: bool) -> PollOptions {
        PollOptions {
            verbose,
            max_entries: self.max_entries_per_poll,
            fetch_timeout: self.fetch_timeout(),
            rules: FieldRules {
                max_length: self.max_field_length,
                scrape_summary_images: self.scrape_summary_images,
            },
            concurrency: self.poll_concurrency,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
