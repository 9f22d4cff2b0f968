use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "CHANNELFEED_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/channelfeed.toml";
const ENV_PREFIX: &str = "CHANNELFEED";
const ENV_SEPARATOR: &str = "__";

const VIDEO_KEY_VAR: &str = "YOUTUBE_API_KEY";
const METADATA_KEY_VAR: &str = "TMDB_API_KEY";
const DRY_RUN_VAR: &str = "DRY_RUN";

/// Default config file location, honouring `CHANNELFEED_CONFIG`
pub fn default_config_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(config_path: PathBuf) -> Result<Config, ConfigError> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, |name| env::var(name).ok());

    Ok(config)
}

/// Apply API keys and the dry-run flag from the environment.
/// Keys are never read from TOML files.
pub fn load_secrets<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty(VIDEO_KEY_VAR) {
        config.video.api_key = Some(key);
    }
    if let Some(key) = non_empty(METADATA_KEY_VAR) {
        config.metadata.api_key = Some(key);
    }
    if let Some(flag) = non_empty(DRY_RUN_VAR) {
        config.output.dry_run = parse_flag(&flag);
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // CHANNELFEED__OUTPUT__DIR -> output.dir
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
