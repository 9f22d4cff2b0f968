use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Output location and dry-run behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_channels_file")]
    pub channels_file: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
    /// Overridden by `DRY_RUN` in the environment
    #[serde(default)]
    pub dry_run: bool,
    /// Entries per category printed in dry-run mode
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            channels_file: default_channels_file(),
            history_file: default_history_file(),
            dry_run: false,
            sample_size: default_sample_size(),
        }
    }
}

impl OutputConfig {
    pub fn channels_path(&self) -> PathBuf {
        self.dir.join(&self.channels_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(&self.history_file)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_channels_file() -> String {
    "channels.json".to_string()
}

fn default_history_file() -> String {
    "url_history.json".to_string()
}

fn default_sample_size() -> usize {
    2
}

/// Hand-maintained override files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalConfig {
    #[serde(default = "default_curated_file")]
    pub curated_file: PathBuf,
    #[serde(default = "default_user_file")]
    pub user_file: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            curated_file: default_curated_file(),
            user_file: default_user_file(),
        }
    }
}

fn default_curated_file() -> PathBuf {
    PathBuf::from("data/curated_channels.json")
}

fn default_user_file() -> PathBuf {
    PathBuf::from("data/user_channels.json")
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("channelfeed/{}", env!("CARGO_PKG_VERSION"))
}

/// Public M3U playlist source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistConfig {
    #[serde(default = "default_playlist_url")]
    pub url: String,
    #[serde(default = "default_max_per_group")]
    pub max_per_group: usize,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            url: default_playlist_url(),
            max_per_group: default_max_per_group(),
        }
    }
}

fn default_playlist_url() -> String {
    "https://iptv-org.github.io/iptv/index.m3u".to_string()
}

fn default_max_per_group() -> usize {
    60
}

/// Video search API source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoConfig {
    #[serde(default = "default_video_base_url")]
    pub base_url: String,
    #[serde(default = "default_watch_url")]
    pub watch_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_video_delay")]
    pub request_delay: HumanDuration,
    /// Loaded from `YOUTUBE_API_KEY`, never from the config file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: default_video_base_url(),
            watch_url: default_watch_url(),
            max_results: default_max_results(),
            request_delay: default_video_delay(),
            api_key: None,
        }
    }
}

fn default_video_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_watch_url() -> String {
    "https://www.youtube.com/watch?v=".to_string()
}

fn default_max_results() -> usize {
    8
}

fn default_video_delay() -> HumanDuration {
    HumanDuration::from_millis(500)
}

/// TV metadata API source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_base_url")]
    pub base_url: String,
    #[serde(default = "default_detail_url")]
    pub detail_url: String,
    #[serde(default = "default_image_url")]
    pub image_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_metadata_delay")]
    pub request_delay: HumanDuration,
    /// Loaded from `TMDB_API_KEY`, never from the config file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metadata_base_url(),
            detail_url: default_detail_url(),
            image_url: default_image_url(),
            max_results: default_max_results(),
            request_delay: default_metadata_delay(),
            api_key: None,
        }
    }
}

fn default_metadata_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_detail_url() -> String {
    "https://www.themoviedb.org/tv/".to_string()
}

fn default_image_url() -> String {
    "https://image.tmdb.org/t/p/w300".to_string()
}

fn default_metadata_delay() -> HumanDuration {
    HumanDuration::from_millis(250)
}

/// Merge limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MergeConfig {
    /// Playlist entries taken per group for each category referencing it
    #[serde(default = "default_per_group_limit")]
    pub per_group_limit: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            per_group_limit: default_per_group_limit(),
        }
    }
}

fn default_per_group_limit() -> usize {
    15
}

/// URL history limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_history_max_entries(),
        }
    }
}

fn default_history_max_entries() -> usize {
    50
}
