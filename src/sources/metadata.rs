//! TV metadata API source (TMDB `discover/tv`)
//!
//! The API is keyed by genre, not by category. Each genre id is requested at
//! most once per run: the first category in table order that names a genre
//! claims it, and later categories sharing that id get no metadata entries.
//! This follows the established feed behaviour; whether it is intended quota
//! saving or an accident of the table layout is still unconfirmed, so it is
//! kept exactly as is.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::pause_between_requests;
use super::traits::{ChannelSource, FetchReport, KeyFailure, SourceError, SourceOutcome};
use crate::categories::CategoryTable;
use crate::config::MetadataConfig;
use crate::http::HttpClient;
use crate::models::{ChannelEntry, DESC_MAX_CHARS, EntryKind, EntrySource, truncate_chars};

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<DiscoverResult>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResult {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    overview: Option<String>,
}

impl DiscoverResult {
    /// Results without an id have no detail page and are dropped
    fn into_entry(self, config: &MetadataConfig) -> Option<ChannelEntry> {
        let id = self.id?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or(self.original_name)
            .unwrap_or_default();

        let logo = self
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|path| format!("{}{}", config.image_url.trim_end_matches('/'), path))
            .unwrap_or_default();

        let desc = truncate_chars(self.overview.as_deref().unwrap_or_default(), DESC_MAX_CHARS);

        Some(ChannelEntry::fetched(
            name,
            format!("{}{}", config.detail_url, id),
            logo,
            desc,
            EntrySource::Metadata,
            EntryKind::Info,
        ))
    }
}

/// Tracks which genre ids have already been requested this run
#[derive(Debug, Default)]
struct GenreClaims(HashSet<u32>);

impl GenreClaims {
    /// True when this call is the first to claim `genre_id`
    fn claim(&mut self, genre_id: u32) -> bool {
        self.0.insert(genre_id)
    }
}

pub struct MetadataSource {
    client: HttpClient,
    config: MetadataConfig,
}

impl MetadataSource {
    pub fn new(client: HttpClient, config: MetadataConfig) -> Self {
        Self { client, config }
    }

    async fn discover(&self, genre_id: u32, api_key: &str) -> Result<Vec<ChannelEntry>, SourceError> {
        let url = format!("{}/discover/tv", self.config.base_url.trim_end_matches('/'));
        let genre = genre_id.to_string();
        let query = [
            ("api_key", api_key),
            ("with_genres", genre.as_str()),
            ("sort_by", "popularity.desc"),
        ];

        let response: DiscoverResponse = self.client.get_json(&url, &query).await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(|result| result.into_entry(&self.config))
            .take(self.config.max_results)
            .collect())
    }
}

#[async_trait]
impl ChannelSource for MetadataSource {
    fn source(&self) -> EntrySource {
        EntrySource::Metadata
    }

    async fn fetch(&self, table: &CategoryTable) -> SourceOutcome {
        let Some(api_key) = self.config.api_key.as_deref() else {
            info!("TMDB_API_KEY not set, skipping metadata lookup");
            return SourceOutcome::skipped("TMDB_API_KEY not set");
        };

        let mut report = FetchReport::default();
        let mut claims = GenreClaims::default();
        let mut issued = 0;

        for category in table {
            if !claims.claim(category.genre_id) {
                debug!(
                    category = %category.name,
                    genre_id = category.genre_id,
                    "Genre already requested by an earlier category, skipping"
                );
                continue;
            }

            pause_between_requests(issued, self.config.request_delay).await;
            issued += 1;

            let entries = match self.discover(category.genre_id, api_key).await {
                Ok(entries) => {
                    debug!(category = %category.name, count = entries.len(), "Metadata lookup done");
                    entries
                }
                Err(error) => {
                    warn!(category = %category.name, error = %error, "Metadata lookup failed");
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
            requests = issued,
            entries = report.entry_count(),
            failed_categories = report.failures.len(),
            "Metadata lookup finished"
        );
        SourceOutcome::Fetched(report)
    }
}
