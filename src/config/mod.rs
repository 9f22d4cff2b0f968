//! Configuration management for channelfeed
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use channelfeed::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Writing feeds to: {}", config.output.dir.display());
//! ```
//!
//! # Environment Variables
//!
//! Any setting can be overridden with `CHANNELFEED__<section>__<key>`:
//! - `CHANNELFEED__OUTPUT__DIR=public`
//! - `CHANNELFEED__PLAYLIST__MAX_PER_GROUP=40`
//! - `CHANNELFEED__VIDEO__REQUEST_DELAY=1s`
//!
//! API keys come only from `YOUTUBE_API_KEY` and `TMDB_API_KEY`, and
//! `DRY_RUN=1` switches the run to dry-run mode.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/channelfeed.toml`.
//! This can be overridden using the `CHANNELFEED_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    Config, HistoryConfig, HttpConfig, LocalConfig, MergeConfig, MetadataConfig, OutputConfig,
    PlaylistConfig, VideoConfig,
};
pub use sources::{default_config_path, load_secrets};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation
    /// fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(default_config_path())
    }

    /// Load from an explicit config file, still applying environment overrides
    /// and secrets.
    pub fn load_with_env(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path without reading secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Whether the video source has a credential to run with
    pub fn video_enabled(&self) -> bool {
        self.video.api_key.is_some()
    }

    /// Whether the metadata source has a credential to run with
    pub fn metadata_enabled(&self) -> bool {
        self.metadata.api_key.is_some()
    }
}
