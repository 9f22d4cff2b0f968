//! Feed document types shared by the sources, the merge and the writers

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Fixed version tag carried by every channels document
pub const FEED_VERSION: &str = "2.0";

/// Maximum description length (in characters) for API-derived entries
pub const DESC_MAX_CHARS: usize = 120;

/// Mapping from a grouping key (playlist group or category name) to entries
pub type GroupedEntries = BTreeMap<String, Vec<ChannelEntry>>;

/// Where an entry came from. Unrecognised tags from local files are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntrySource {
    Playlist,
    Video,
    Metadata,
    Curated,
    User,
    Other(String),
}

impl EntrySource {
    pub fn as_str(&self) -> &str {
        match self {
            EntrySource::Playlist => "iptv",
            EntrySource::Video => "youtube",
            EntrySource::Metadata => "tmdb",
            EntrySource::Curated => "curated",
            EntrySource::User => "user",
            EntrySource::Other(tag) => tag,
        }
    }
}

impl From<String> for EntrySource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "iptv" => EntrySource::Playlist,
            "youtube" => EntrySource::Video,
            "tmdb" => EntrySource::Metadata,
            "curated" => EntrySource::Curated,
            "user" => EntrySource::User,
            _ => EntrySource::Other(value),
        }
    }
}

impl From<EntrySource> for String {
    fn from(value: EntrySource) -> Self {
        match value {
            EntrySource::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback hint for the client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    Live,
    Vod,
    Mp4,
    Info,
    Other(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Live => "live",
            EntryKind::Vod => "vod",
            EntryKind::Mp4 => "mp4",
            EntryKind::Info => "info",
            EntryKind::Other(kind) => kind,
        }
    }
}

impl From<String> for EntryKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "live" => EntryKind::Live,
            "vod" => EntryKind::Vod,
            "mp4" => EntryKind::Mp4,
            "info" => EntryKind::Info,
            _ => EntryKind::Other(value),
        }
    }
}

impl From<EntryKind> for String {
    fn from(value: EntryKind) -> Self {
        match value {
            EntryKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

/// One playable or informational item in the feed.
///
/// Local override files only need `url`; every other field is optional there
/// and unknown fields pass through untouched. See [`ChannelEntry::from_override`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EntrySource>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChannelEntry {
    /// Build a fetched entry; fetched entries always carry `logo` and `desc`
    pub fn fetched(
        name: impl Into<String>,
        url: impl Into<String>,
        logo: impl Into<String>,
        desc: impl Into<String>,
        source: EntrySource,
        kind: EntryKind,
    ) -> Self {
        Self {
            name: Some(name.into()),
            url: url.into(),
            logo: Some(logo.into()),
            desc: Some(desc.into()),
            source: Some(source),
            kind: Some(kind),
            category: None,
            extra: Map::new(),
        }
    }

    /// Build an entry from one item of a local override file.
    ///
    /// A field holding an unexpected type is kept verbatim among the extra
    /// fields instead of failing the item. A `url` that is not a string counts
    /// as missing. `source` and `category` are dropped since the merge assigns
    /// both. Returns `None` when the item is not a JSON object.
    pub fn from_override(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let url = match fields.remove("url") {
            Some(Value::String(url)) => url,
            _ => String::new(),
        };
        let name = take_string(&mut fields, "name");
        let logo = take_string(&mut fields, "logo");
        let desc = take_string(&mut fields, "desc");
        let kind = take_string(&mut fields, "type").map(EntryKind::from);
        fields.remove("source");
        fields.remove("category");

        Some(Self {
            name,
            url,
            logo,
            desc,
            source: None,
            kind,
            category: None,
            extra: fields,
        })
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_source(mut self, source: EntrySource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(text) => Some(text),
        other => {
            fields.insert(key.to_string(), other);
            None
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Category lists in category-table order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryLists(Vec<(String, Vec<ChannelEntry>)>);

impl CategoryLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: impl Into<String>, entries: Vec<ChannelEntry>) {
        self.0.push((category.into(), entries));
    }

    pub fn get(&self, category: &str) -> Option<&[ChannelEntry]> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ChannelEntry])> {
        self.0
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.0.iter().map(|(_, entries)| entries.len()).sum()
    }
}

impl Serialize for CategoryLists {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entries) in &self.0 {
            map.serialize_entry(name, entries)?;
        }
        map.end()
    }
}

/// The `channels.json` document
#[derive(Debug, Clone, Serialize)]
pub struct ChannelDocument {
    pub updated: DateTime<Utc>,
    pub version: String,
    pub categories: CategoryLists,
}
