use super::models::Config;
use crate::history::DEFAULT_URLS;
use thiserror::Error;

/// Hard ceiling of the video search API's `maxResults`
const VIDEO_MAX_RESULTS_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be an http(s) URL, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },

    #[error("video.max_results ({actual}) exceeds the API limit of {limit}")]
    VideoResultsExceedLimit { actual: usize, limit: usize },

    #[error("history.max_entries ({actual}) must hold the {required} default URLs")]
    HistoryTooSmall { actual: usize, required: usize },

    #[error("output.{field} must be a bare file name, got '{value}'")]
    InvalidFileName { field: &'static str, value: String },

    #[error("output.channels_file and output.history_file must differ")]
    OutputFilesCollide,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_urls(config)?;
    validate_limits(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_urls(config: &Config) -> Result<(), ValidationError> {
    let urls = [
        ("playlist.url", &config.playlist.url),
        ("video.base_url", &config.video.base_url),
        ("video.watch_url", &config.video.watch_url),
        ("metadata.base_url", &config.metadata.base_url),
        ("metadata.detail_url", &config.metadata.detail_url),
        ("metadata.image_url", &config.metadata.image_url),
    ];

    for (field, value) in urls {
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ValidationError> {
    let limits = [
        ("playlist.max_per_group", config.playlist.max_per_group),
        ("video.max_results", config.video.max_results),
        ("metadata.max_results", config.metadata.max_results),
        ("merge.per_group_limit", config.merge.per_group_limit),
    ];

    for (field, value) in limits {
        if value == 0 {
            return Err(ValidationError::ZeroLimit { field });
        }
    }

    if config.video.max_results > VIDEO_MAX_RESULTS_LIMIT {
        return Err(ValidationError::VideoResultsExceedLimit {
            actual: config.video.max_results,
            limit: VIDEO_MAX_RESULTS_LIMIT,
        });
    }

    // The defaults are always inserted first, so the cap has to fit them all
    if config.history.max_entries < DEFAULT_URLS.len() {
        return Err(ValidationError::HistoryTooSmall {
            actual: config.history.max_entries,
            required: DEFAULT_URLS.len(),
        });
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<(), ValidationError> {
    let files = [
        ("channels_file", &config.output.channels_file),
        ("history_file", &config.output.history_file),
    ];

    for (field, value) in files {
        if value.is_empty() || value.contains('/') || value.contains('\\') {
            return Err(ValidationError::InvalidFileName {
                field,
                value: value.clone(),
            });
        }
    }

    if config.output.channels_file == config.output.history_file {
        return Err(ValidationError::OutputFilesCollide);
    }

    Ok(())
}
