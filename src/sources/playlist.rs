//! Public M3U playlist source
//!
//! Expects the `#EXTM3U` flavor where each `#EXTINF` line carries
//! `tvg-id`, `tvg-logo` and `group-title` attributes and ends with the
//! display name after the last comma:
//!
//! ```text
//! #EXTINF:-1 tvg-id="News24.us" tvg-logo="https://x/logo.png" group-title="News",News 24
//! https://example.com/news24/index.m3u8
//! ```

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

use super::traits::{ChannelSource, SourceOutcome};
use crate::categories::CategoryTable;
use crate::config::PlaylistConfig;
use crate::http::HttpClient;
use crate::models::{ChannelEntry, EntryKind, EntrySource, GroupedEntries};

/// Group used when an entry carries no `group-title`
pub const DEFAULT_GROUP: &str = "General";

const EXTINF_PREFIX: &str = "#EXTINF";

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"group-title="([^"]*)""#).unwrap());
static LOGO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"tvg-logo="([^"]*)""#).unwrap());
static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"tvg-id="([^"]*)""#).unwrap());

/// Metadata announced by an `#EXTINF` line, waiting for its URL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub tvg_id: String,
    pub name: String,
    pub logo: String,
    pub group: String,
}

impl PlaylistItem {
    /// Parse the metadata half of an entry
    pub fn from_extinf(line: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };

        let tvg_id = capture(&ID_RE);
        let logo = capture(&LOGO_RE);
        let group = Some(capture(&GROUP_RE))
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());

        let name = line
            .rfind(',')
            .map(|pos| line[pos + 1..].trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| tvg_id.clone());

        Self {
            tvg_id,
            name,
            logo,
            group,
        }
    }

    fn into_entry(self, url: &str) -> ChannelEntry {
        ChannelEntry::fetched(
            self.name,
            url,
            self.logo,
            "",
            EntrySource::Playlist,
            EntryKind::Live,
        )
    }
}

/// Parse playlist text into entries keyed by group, at most `max_per_group` each
pub fn parse_playlist(content: &str, max_per_group: usize) -> GroupedEntries {
    let mut groups = GroupedEntries::new();
    let mut pending: Option<PlaylistItem> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTINF_PREFIX) {
            pending = Some(PlaylistItem::from_extinf(line));
            continue;
        }

        // #EXTM3U, #EXTVLCOPT and friends
        if line.starts_with('#') {
            continue;
        }

        let Some(item) = pending.take() else {
            continue;
        };

        let entries = groups.entry(item.group.clone()).or_default();
        if entries.len() < max_per_group {
            entries.push(item.into_entry(line));
        }
    }

    groups
}

/// Fetches the public playlist and groups it by `group-title`
pub struct PlaylistSource {
    client: HttpClient,
    config: PlaylistConfig,
}

impl PlaylistSource {
    pub fn new(client: HttpClient, config: PlaylistConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ChannelSource for PlaylistSource {
    fn source(&self) -> EntrySource {
        EntrySource::Playlist
    }

    async fn fetch(&self, _table: &CategoryTable) -> SourceOutcome {
        let url = &self.config.url;
        info!(url, "Fetching playlist");

        match self.client.get_text(url).await {
            Ok(body) => {
                let groups = parse_playlist(&body, self.config.max_per_group);
                info!(
                    url,
                    groups = groups.len(),
                    entries = groups.values().map(Vec::len).sum::<usize>(),
                    "Parsed playlist"
                );
                SourceOutcome::fetched(groups)
            }
            Err(e) => {
                warn!(url, error = %e, "Playlist fetch failed, continuing without it");
                SourceOutcome::Failed(e.into())
            }
        }
    }
}
