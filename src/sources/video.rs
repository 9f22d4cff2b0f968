//! Video search API source (YouTube Data API v3 `search` endpoint)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::pause_between_requests;
use super::traits::{ChannelSource, FetchReport, KeyFailure, SourceError, SourceOutcome};
use crate::categories::{CategoryDescriptor, CategoryTable};
use crate::config::VideoConfig;
use crate::http::HttpClient;
use crate::models::{ChannelEntry, DESC_MAX_CHARS, EntryKind, EntrySource, truncate_chars};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    /// Object with `videoId` for video results; other kinds vary
    #[serde(default)]
    id: Value,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: String,
}

impl Thumbnails {
    fn best_url(&self) -> String {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .find(|url| !url.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

impl SearchItem {
    fn video_id(&self) -> Option<&str> {
        self.id
            .get("videoId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Results without a resolvable video id are dropped
    fn into_entry(self, watch_url: &str) -> Option<ChannelEntry> {
        let url = format!("{}{}", watch_url, self.video_id()?);
        Some(ChannelEntry::fetched(
            self.snippet.title,
            url,
            self.snippet.thumbnails.best_url(),
            truncate_chars(&self.snippet.description, DESC_MAX_CHARS),
            EntrySource::Video,
            EntryKind::Vod,
        ))
    }
}

/// Runs one search per category, strictly sequentially
pub struct VideoSearchSource {
    client: HttpClient,
    config: VideoConfig,
}

impl VideoSearchSource {
    pub fn new(client: HttpClient, config: VideoConfig) -> Self {
        Self { client, config }
    }

    async fn search(
        &self,
        category: &CategoryDescriptor,
        api_key: &str,
    ) -> Result<Vec<ChannelEntry>, SourceError> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.max_results.to_string();
        let query = [
            ("part", "snippet"),
            ("type", "video"),
            ("q", category.search_query.as_str()),
            ("maxResults", max_results.as_str()),
            ("key", api_key),
        ];

        let response: SearchResponse = self.client.get_json(&url, &query).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.into_entry(&self.config.watch_url))
            .take(self.config.max_results)
            .collect())
    }
}

#[async_trait]
impl ChannelSource for VideoSearchSource {
    fn source(&self) -> EntrySource {
        EntrySource::Video
    }

    async fn fetch(&self, table: &CategoryTable) -> SourceOutcome {
        let Some(api_key) = self.config.api_key.as_deref() else {
            info!("YOUTUBE_API_KEY not set, skipping video search");
            return SourceOutcome::skipped("YOUTUBE_API_KEY not set");
        };

        let mut report = FetchReport::default();

        for (index, category) in table.iter().enumerate() {
            pause_between_requests(index, self.config.request_delay).await;

            let entries = match self.search(category, api_key).await {
                Ok(entries) => {
                    debug!(category = %category.name, count = entries.len(), "Video search done");
                    entries
                }
                Err(error) => {
                    warn!(category = %category.name, error = %error, "Video search failed");
                    report.failures.push(KeyFailure {
                        key: category.name.clone(),
                        error,
                    });
                    Vec::new()
                }
            };
            report.entries.insert(category.name.clone(), entries);
        }

        info!(
            entries = report.entry_count(),
            failed_categories = report.failures.len(),
            "Video search finished"
        );
        SourceOutcome::Fetched(report)
    }
}
