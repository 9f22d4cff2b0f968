//! External listing sources
//!
//! Each source turns one upstream into a mapping from a grouping key to
//! normalized [`ChannelEntry`](crate::models::ChannelEntry) values.
//!
//! ## Key Components
//!
//! - [`ChannelSource`] - async trait every source implements
//! - [`SourceOutcome`] - fetched / skipped / failed, never an `Err`
//! - [`PlaylistSource`] - public M3U playlist, keyed by `group-title`
//! - [`VideoSearchSource`] - video search API, keyed by category
//! - [`MetadataSource`] - TV metadata API, keyed by category
//! - [`SourceSet`] - the three sources the pipeline runs concurrently

mod metadata;
mod playlist;
mod traits;
mod video;

pub use metadata::MetadataSource;
pub use playlist::{DEFAULT_GROUP, PlaylistItem, PlaylistSource, parse_playlist};
pub use traits::{ChannelSource, FetchReport, KeyFailure, SourceError, SourceOutcome};
pub use video::VideoSearchSource;

use std::sync::Arc;

use crate::config::Config;
use crate::humanize::HumanDuration;
use crate::http::{HttpClient, HttpError};

/// The three upstreams, in merge precedence order
#[derive(Clone)]
pub struct SourceSet {
    pub playlist: Arc<dyn ChannelSource>,
    pub video: Arc<dyn ChannelSource>,
    pub metadata: Arc<dyn ChannelSource>,
}

impl SourceSet {
    /// Build the real HTTP-backed sources sharing one client
    pub fn from_config(config: &Config) -> Result<Self, HttpError> {
        let client = HttpClient::new(&config.http)?;

        Ok(Self {
            playlist: Arc::new(PlaylistSource::new(client.clone(), config.playlist.clone())),
            video: Arc::new(VideoSearchSource::new(client.clone(), config.video.clone())),
            metadata: Arc::new(MetadataSource::new(client, config.metadata.clone())),
        })
    }
}

/// Self-imposed rate limit: sleep before every request but the first
pub(crate) async fn pause_between_requests(issued: usize, delay: HumanDuration) {
    if issued > 0 && !delay.is_zero() {
        tokio::time::sleep(delay.as_duration()).await;
    }
}
