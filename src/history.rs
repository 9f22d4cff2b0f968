//! URL history document: fixed defaults plus whatever the last run persisted

use serde_json::Value;
use std::collections::HashSet;

/// Always listed first, so they survive any cap of at least ten
pub const DEFAULT_URLS: [&str; 10] = [
    "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8",
    "https://devstreaming-cdn.apple.com/videos/streaming/examples/img_bipbop_adv_example_fmp4/master.m3u8",
    "https://cph-p2p-msl.akamaized.net/hls/live/2000341/test/master.m3u8",
    "https://bitdash-a.akamaihd.net/content/sintel/hls/playlist.m3u8",
    "https://demo.unified-streaming.com/k8s/features/stable/video/tears-of-steel/tears-of-steel.ism/.m3u8",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/Sintel.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/TearsOfSteel.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4",
];

/// URLs from a persisted history file.
///
/// Accepts a bare array or an object with a `urls` array. Non-string items
/// and any other shape contribute nothing.
pub fn persisted_urls(persisted: &Value) -> Vec<&str> {
    let list = match persisted {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("urls") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    list.iter().filter_map(Value::as_str).collect()
}

/// Defaults, then persisted URLs, deduplicated in first-seen order and capped
pub fn build_history(defaults: &[&str], persisted: Option<&Value>, max_entries: usize) -> Vec<String> {
    let previous = persisted.map(persisted_urls).unwrap_or_default();

    let mut seen = HashSet::new();
    defaults
        .iter()
        .copied()
        .chain(previous)
        .filter(|url| seen.insert(*url))
        .take(max_entries)
        .map(str::to_string)
        .collect()
}
