//! Loaders for the on-disk inputs: curated overrides, user submissions and
//! the URL history persisted by the previous run.
//!
//! None of these files is required. A missing file and an unreadable one are
//! both reported through [`LoadOutcome`] and never abort the run.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::ChannelEntry;

/// Category name -> partially filled entries
pub type OverrideMap = BTreeMap<String, Vec<ChannelEntry>>;

#[derive(Debug, Error)]
pub enum LocalError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Explicit result of a tolerant file load
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Loaded(T),
    Missing,
    Invalid(LocalError),
}

impl<T> LoadOutcome<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded(_) => "loaded",
            LoadOutcome::Missing => "missing",
            LoadOutcome::Invalid(_) => "invalid",
        }
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            LoadOutcome::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadOutcome<U> {
        match self {
            LoadOutcome::Loaded(data) => LoadOutcome::Loaded(f(data)),
            LoadOutcome::Missing => LoadOutcome::Missing,
            LoadOutcome::Invalid(e) => LoadOutcome::Invalid(e),
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            LoadOutcome::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

impl<T: Default> LoadOutcome<T> {
    pub fn into_data(self) -> T {
        self.into_loaded().unwrap_or_default()
    }
}

/// Read and parse a JSON file, classifying every failure
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> LoadOutcome<T> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "Optional file not found");
            return LoadOutcome::Missing;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read file, ignoring it");
            return LoadOutcome::Invalid(e.into());
        }
    };

    match serde_json::from_str(&text) {
        Ok(data) => {
            debug!(path = %path.display(), "Loaded file");
            LoadOutcome::Loaded(data)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse file, ignoring it");
            LoadOutcome::Invalid(e.into())
        }
    }
}

/// Load a curated or user-submitted override file.
///
/// Only unparseable JSON or a top level that is not an object rejects the
/// file. A category whose value is not a list, or an item that is not an
/// object, is skipped on its own.
pub async fn load_overrides(path: &Path) -> LoadOutcome<OverrideMap> {
    let outcome = load_json::<BTreeMap<String, Value>>(path)
        .await
        .map(|raw| overrides_from_raw(path, raw));
    if let LoadOutcome::Loaded(map) = &outcome {
        info!(
            path = %path.display(),
            categories = map.len(),
            entries = map.values().map(Vec::len).sum::<usize>(),
            "Loaded overrides"
        );
    }
    outcome
}

fn overrides_from_raw(path: &Path, raw: BTreeMap<String, Value>) -> OverrideMap {
    let mut map = OverrideMap::new();
    for (category, value) in raw {
        let Value::Array(items) = value else {
            warn!(path = %path.display(), category = %category, "Override category is not a list, skipping it");
            continue;
        };

        let total = items.len();
        let entries: Vec<ChannelEntry> = items
            .into_iter()
            .filter_map(ChannelEntry::from_override)
            .collect();
        if entries.len() < total {
            warn!(
                path = %path.display(),
                category = %category,
                skipped = total - entries.len(),
                "Skipped override items that are not objects"
            );
        }
        map.insert(category, entries);
    }
    map
}

/// Load the previously written history file in whatever shape it has
pub async fn load_history(path: &Path) -> LoadOutcome<Value> {
    load_json::<Value>(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = load_overrides(&temp_dir.path().join("absent.json")).await;
        assert!(matches!(outcome, LoadOutcome::Missing));
        assert!(outcome.into_data().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_invalid_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("curated.json");
        fs::write(&path, "{ not json").unwrap();

        let outcome = load_overrides(&path).await;
        assert!(matches!(outcome, LoadOutcome::Invalid(LocalError::Parse(_))));
        assert_eq!(outcome.status(), "invalid");
        assert!(outcome.into_data().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("user.json");
        fs::write(&path, r#"["https://example.com/a.m3u8"]"#).unwrap();

        let outcome = load_overrides(&path).await;
        assert!(matches!(outcome, LoadOutcome::Invalid(_)));
    }

    #[tokio::test]
    async fn test_loads_partial_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("curated.json");
        fs::write(
            &path,
            r#"{
                "news": [
                    {"name": "City News", "url": "https://example.com/city.m3u8", "type": "live"},
                    {"url": "https://example.com/bare.mp4"}
                ],
                "music": []
            }"#,
        )
        .unwrap();

        let outcome = load_overrides(&path).await;
        assert!(outcome.is_loaded());
        let map = outcome.into_data();
        assert_eq!(map["news"].len(), 2);
        assert_eq!(map["news"][0].kind, Some(EntryKind::Live));
        assert!(map["news"][1].kind.is_none());
        assert!(map["music"].is_empty());
    }

    #[tokio::test]
    async fn test_odd_field_types_do_not_reject_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("user.json");
        fs::write(
            &path,
            r#"{
                "news": [
                    {"name": "A", "url": "https://a.example/1"},
                    {"name": null, "url": "https://a.example/2"},
                    {"name": 7, "url": "https://a.example/3"},
                    "https://a.example/not-an-object"
                ],
                "sports": {"url": "https://a.example/not-a-list"},
                "music": [{"name": "Radio", "url": "https://a.example/radio"}]
            }"#,
        )
        .unwrap();

        let outcome = load_overrides(&path).await;
        assert_eq!(outcome.status(), "loaded");
        let map = outcome.into_data();

        let urls: Vec<&str> = map["news"].iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a.example/1", "https://a.example/2", "https://a.example/3"]
        );
        assert_eq!(map["news"][0].name.as_deref(), Some("A"));
        assert!(map["news"][1].name.is_none());
        assert_eq!(map["news"][2].extra.get("name"), Some(&serde_json::json!(7)));
        assert!(!map.contains_key("sports"));
        assert_eq!(map["music"].len(), 1);
    }

    #[tokio::test]
    async fn test_history_accepts_any_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("url_history.json");
        fs::write(&path, r#"{"urls": ["https://example.com/a"]}"#).unwrap();

        let outcome = load_history(&path).await;
        assert_eq!(
            outcome.as_loaded().and_then(|v| v.get("urls")).map(|u| u.is_array()),
            Some(true)
        );
    }
}
