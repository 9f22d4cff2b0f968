//! End-to-end pipeline tests against a local mock upstream
//!
//! One axum server stands in for all three upstreams:
//! - `GET /playlist.m3u` - the M3U playlist
//! - `GET /yt/search` - video search
//! - `GET /tmdb/discover/tv` - TV metadata discovery

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use channelfeed::categories::CategoryTable;
use channelfeed::config::{Config, HumanDuration};
use channelfeed::history::DEFAULT_URLS;
use channelfeed::models::{EntrySource, GroupedEntries};
use channelfeed::pipeline::Pipeline;
use channelfeed::sources::{ChannelSource, SourceOutcome, SourceSet};

#[derive(Clone)]
struct MockState {
    playlist_status: StatusCode,
    failing_query: Option<String>,
    video_requests: Arc<AtomicUsize>,
    metadata_requests: Arc<AtomicUsize>,
}

impl MockState {
    fn healthy() -> Self {
        Self {
            playlist_status: StatusCode::OK,
            failing_query: None,
            video_requests: Arc::new(AtomicUsize::new(0)),
            metadata_requests: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// 20 News, 10 General (one without a group-title), 3 Sports
fn playlist_body() -> String {
    let mut body = String::from("#EXTM3U\n");
    for i in 0..20 {
        body.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"news{i}\" tvg-logo=\"https://logo.example/n{i}.png\" group-title=\"News\",News {i}\nhttps://iptv.example/news/{i}\n"
        ));
    }
    for i in 0..9 {
        body.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"gen{i}\" group-title=\"General\",General {i}\nhttps://iptv.example/general/{i}\n"
        ));
    }
    body.push_str("#EXTINF:-1 tvg-id=\"nogroup\",No Group\nhttps://iptv.example/general/nogroup\n");
    for i in 0..3 {
        body.push_str(&format!(
            "#EXTINF:-1 group-title=\"Sports\",Sport {i}\nhttps://iptv.example/sports/{i}\n"
        ));
    }
    body
}

async fn playlist(State(state): State<MockState>) -> Response {
    (state.playlist_status, playlist_body()).into_response()
}

async fn search(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.video_requests.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    if params.get("key").map(String::as_str) != Some("yt-test-key") {
        return StatusCode::FORBIDDEN.into_response();
    }
    if state.failing_query.as_deref() == Some(q.as_str()) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let slug = q.replace(' ', "-");
    Json(json!({
        "items": [
            {
                "id": {"kind": "youtube#video", "videoId": format!("{slug}-1")},
                "snippet": {
                    "title": format!("{q} clip"),
                    "description": "x".repeat(300),
                    "thumbnails": {"medium": {"url": "https://i.example/thumb.jpg"}}
                }
            },
            {"id": {"kind": "youtube#channel", "channelId": "UC123"}, "snippet": {"title": "A channel"}}
        ]
    }))
    .into_response()
}

async fn discover(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.metadata_requests.fetch_add(1, Ordering::SeqCst);
    let genre: u64 = params
        .get("with_genres")
        .and_then(|g| g.parse().ok())
        .unwrap_or_default();

    Json(json!({
        "page": 1,
        "results": [
            {"id": genre * 10 + 1, "name": format!("Show {genre}"), "poster_path": "/p.jpg", "overview": "o"}
        ]
    }))
}

async fn start_mock_upstream(state: MockState) -> SocketAddr {
    let app = Router::new()
        .route("/playlist.m3u", get(playlist))
        .route("/yt/search", get(search))
        .route("/tmdb/discover/tv", get(discover))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_config(addr: SocketAddr, root: &Path, with_keys: bool) -> Config {
    let mut config = Config::default();
    config.output.dir = root.join("docs");
    config.local.curated_file = root.join("curated_channels.json");
    config.local.user_file = root.join("user_channels.json");
    config.playlist.url = format!("http://{addr}/playlist.m3u");
    config.video.base_url = format!("http://{addr}/yt");
    config.video.request_delay = HumanDuration::from_millis(0);
    config.metadata.base_url = format!("http://{addr}/tmdb");
    config.metadata.request_delay = HumanDuration::from_millis(0);
    if with_keys {
        config.video.api_key = Some("yt-test-key".to_string());
        config.metadata.api_key = Some("tmdb-test-key".to_string());
    }
    config
}

fn write_local_files(root: &Path) {
    std::fs::write(
        root.join("curated_channels.json"),
        json!({
            "news": [
                {"name": "Curated copy", "url": "https://iptv.example/news/0", "type": "live"},
                {"name": "Curated only", "url": "https://curated.example/news.mp4", "source": "user"}
            ],
            "weather": [{"url": "https://curated.example/weather"}]
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        root.join("user_channels.json"),
        json!({
            "news": [
                {"name": "Submitted", "url": "https://user.example/news"},
                {"name": "No url"}
            ],
            "music": [{"name": "Radio", "url": "https://user.example/radio", "type": "mp4"}]
        })
        .to_string(),
    )
    .unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn category<'a>(doc: &'a Value, name: &str) -> &'a Vec<Value> {
    doc["categories"][name].as_array().unwrap()
}

fn count_source(entries: &[Value], source: &str) -> usize {
    entries.iter().filter(|e| e["source"] == source).count()
}

fn assert_feed_invariants(doc: &Value) {
    let categories = doc["categories"].as_object().unwrap();
    let table = CategoryTable::standard();
    let expected: HashSet<&str> = table.names().collect();
    let actual: HashSet<&str> = categories.keys().map(String::as_str).collect();
    assert_eq!(actual, expected);

    for (name, entries) in categories {
        let entries = entries.as_array().unwrap();
        let urls: HashSet<&str> = entries.iter().map(|e| e["url"].as_str().unwrap()).collect();
        assert_eq!(urls.len(), entries.len(), "duplicate url in {name}");
        assert!(urls.iter().all(|u| !u.trim().is_empty()), "empty url in {name}");
        assert!(entries.iter().all(|e| e["category"] == name.as_str()));
    }
}

#[tokio::test]
async fn test_full_run_writes_both_documents() {
    let temp_dir = TempDir::new().unwrap();
    let state = MockState::healthy();
    let addr = start_mock_upstream(state.clone()).await;
    write_local_files(temp_dir.path());

    let config = test_config(addr, temp_dir.path(), true);
    let pipeline = Pipeline::new(config).unwrap();
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.categories, 16);
    assert_eq!(summary.curated, "loaded");
    assert_eq!(summary.user, "loaded");
    assert_eq!(
        summary.source_status(&EntrySource::Playlist).map(|s| s.status),
        Some("fetched")
    );

    let doc = read_json(&temp_dir.path().join("docs/channels.json"));
    assert_eq!(doc["version"], "2.0");
    assert!(doc["updated"].as_str().is_some());
    assert_feed_invariants(&doc);

    // 15 News + 10 General + video + metadata + 1 curated (other is a dup) + 1 user
    let news = category(&doc, "news");
    assert_eq!(news.len(), 29);
    assert_eq!(count_source(news, "iptv"), 25);
    assert_eq!(count_source(news, "youtube"), 1);
    assert_eq!(count_source(news, "tmdb"), 1);
    assert_eq!(count_source(news, "curated"), 1);
    assert_eq!(count_source(news, "user"), 1);

    // the playlist copy of the shared URL wins
    let shared = news
        .iter()
        .find(|e| e["url"] == "https://iptv.example/news/0")
        .unwrap();
    assert_eq!(shared["source"], "iptv");
    assert_eq!(shared["name"], "News 0");

    // precedence order is preserved in the output
    let order: Vec<&str> = news.iter().map(|e| e["source"].as_str().unwrap()).collect();
    let first_of = |s: &str| order.iter().position(|o| *o == s).unwrap();
    assert!(first_of("iptv") < first_of("youtube"));
    assert!(first_of("youtube") < first_of("tmdb"));
    assert!(first_of("tmdb") < first_of("curated"));
    assert!(first_of("curated") < first_of("user"));

    let video = news.iter().find(|e| e["source"] == "youtube").unwrap();
    assert_eq!(video["type"], "vod");
    assert_eq!(video["logo"], "https://i.example/thumb.jpg");
    assert_eq!(video["desc"].as_str().unwrap().chars().count(), 120);

    let music = category(&doc, "music");
    let radio = music.iter().find(|e| e["source"] == "user").unwrap();
    assert_eq!(radio["type"], "mp4");

    let history = read_json(&temp_dir.path().join("docs/url_history.json"));
    assert_eq!(history.as_array().unwrap().len(), DEFAULT_URLS.len());

    // one search per category
    assert_eq!(state.video_requests.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn test_metadata_requests_once_per_genre() {
    let temp_dir = TempDir::new().unwrap();
    let state = MockState::healthy();
    let addr = start_mock_upstream(state.clone()).await;

    let pipeline = Pipeline::new(test_config(addr, temp_dir.path(), true)).unwrap();
    pipeline.run().await.unwrap();

    let distinct_genres: HashSet<u32> = CategoryTable::standard().iter().map(|c| c.genre_id).collect();
    assert_eq!(
        state.metadata_requests.load(Ordering::SeqCst),
        distinct_genres.len()
    );

    let doc = read_json(&temp_dir.path().join("docs/channels.json"));
    // documentary claims genre 99 first; science shares it and gets nothing
    assert_eq!(count_source(category(&doc, "documentary"), "tmdb"), 1);
    assert_eq!(count_source(category(&doc, "science"), "tmdb"), 0);
    assert_eq!(count_source(category(&doc, "business"), "tmdb"), 0);
}

#[tokio::test]
async fn test_missing_keys_skip_api_sources() {
    let temp_dir = TempDir::new().unwrap();
    let state = MockState::healthy();
    let addr = start_mock_upstream(state.clone()).await;
    write_local_files(temp_dir.path());

    let pipeline = Pipeline::new(test_config(addr, temp_dir.path(), false)).unwrap();
    let summary = pipeline.run().await.unwrap();

    assert_eq!(
        summary.source_status(&EntrySource::Video).map(|s| s.status),
        Some("skipped")
    );
    assert_eq!(
        summary.source_status(&EntrySource::Metadata).map(|s| s.status),
        Some("skipped")
    );
    assert_eq!(state.video_requests.load(Ordering::SeqCst), 0);
    assert_eq!(state.metadata_requests.load(Ordering::SeqCst), 0);

    let doc = read_json(&temp_dir.path().join("docs/channels.json"));
    assert_feed_invariants(&doc);
    for (_, entries) in doc["categories"].as_object().unwrap() {
        for entry in entries.as_array().unwrap() {
            let source = entry["source"].as_str().unwrap();
            assert!(["iptv", "curated", "user"].contains(&source));
        }
    }
}

#[tokio::test]
async fn test_playlist_failure_is_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let state = MockState {
        playlist_status: StatusCode::BAD_GATEWAY,
        ..MockState::healthy()
    };
    let addr = start_mock_upstream(state).await;
    write_local_files(temp_dir.path());

    let pipeline = Pipeline::new(test_config(addr, temp_dir.path(), false)).unwrap();
    let summary = pipeline.run().await.unwrap();
    assert_eq!(
        summary.source_status(&EntrySource::Playlist).map(|s| s.status),
        Some("failed")
    );

    let doc = read_json(&temp_dir.path().join("docs/channels.json"));
    assert_feed_invariants(&doc);
    let news = category(&doc, "news");
    let names: Vec<&str> = news.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Curated copy", "Curated only", "Submitted"]);
    assert_eq!(news[1]["source"], "curated");
    assert!(category(&doc, "sports").is_empty());
}

#[tokio::test]
async fn test_one_failed_search_only_empties_that_category() {
    let temp_dir = TempDir::new().unwrap();
    let table = CategoryTable::standard();
    let news_query = table.get("news").unwrap().search_query.clone();
    let state = MockState {
        failing_query: Some(news_query),
        ..MockState::healthy()
    };
    let addr = start_mock_upstream(state.clone()).await;

    let pipeline = Pipeline::new(test_config(addr, temp_dir.path(), true)).unwrap();
    let summary = pipeline.run().await.unwrap();
    assert_eq!(
        summary.source_status(&EntrySource::Video).map(|s| s.status),
        Some("partial")
    );
    assert_eq!(state.video_requests.load(Ordering::SeqCst), 16);

    let doc = read_json(&temp_dir.path().join("docs/channels.json"));
    assert_eq!(count_source(category(&doc, "news"), "youtube"), 0);
    assert_eq!(count_source(category(&doc, "sports"), "youtube"), 1);
}

#[tokio::test]
async fn test_dry_run_prints_sample_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let addr = start_mock_upstream(MockState::healthy()).await;

    let mut config = test_config(addr, temp_dir.path(), false);
    config.output.dry_run = true;
    let pipeline = Pipeline::new(config).unwrap();

    let mut out = Vec::new();
    let summary = pipeline.run_with_output(&mut out).await.unwrap();

    assert!(summary.dry_run);
    assert!(summary.written.is_empty());
    assert!(!temp_dir.path().join("docs").exists());

    let sample: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(sample["counts"]["news"], 25);
    assert_eq!(sample["sample"]["news"].as_array().unwrap().len(), 2);
    assert_eq!(sample["history_entries"], DEFAULT_URLS.len());
}

#[tokio::test]
async fn test_history_carries_over_and_is_stable() {
    let temp_dir = TempDir::new().unwrap();
    let addr = start_mock_upstream(MockState::healthy()).await;

    let docs = temp_dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(
        docs.join("url_history.json"),
        json!({"urls": ["https://old.example/1", DEFAULT_URLS[2], "https://old.example/2"]}).to_string(),
    )
    .unwrap();

    let pipeline = Pipeline::new(test_config(addr, temp_dir.path(), false)).unwrap();

    pipeline.run().await.unwrap();
    let first = read_json(&docs.join("url_history.json"));
    let first_list = first.as_array().unwrap();
    assert_eq!(first_list.len(), DEFAULT_URLS.len() + 2);
    assert_eq!(first_list[0], DEFAULT_URLS[0]);
    assert_eq!(first_list[DEFAULT_URLS.len()], "https://old.example/1");

    pipeline.run().await.unwrap();
    let second = read_json(&docs.join("url_history.json"));
    assert_eq!(first, second);
}

/// Stand-in source returning a fixed outcome without any network access
struct StaticSource {
    source: EntrySource,
    entries: Option<GroupedEntries>,
}

#[async_trait]
impl ChannelSource for StaticSource {
    fn source(&self) -> EntrySource {
        self.source.clone()
    }

    async fn fetch(&self, _table: &CategoryTable) -> SourceOutcome {
        match &self.entries {
            Some(entries) => SourceOutcome::fetched(entries.clone()),
            None => SourceOutcome::skipped("static"),
        }
    }
}

#[tokio::test]
async fn test_empty_sources_keep_every_category_key() {
    let temp_dir = TempDir::new().unwrap();
    write_local_files(temp_dir.path());

    let mut config = Config::default();
    config.output.dir = temp_dir.path().join("docs");
    config.local.curated_file = temp_dir.path().join("curated_channels.json");
    config.local.user_file = temp_dir.path().join("missing_user_channels.json");

    let sources = SourceSet {
        playlist: Arc::new(StaticSource {
            source: EntrySource::Playlist,
            entries: Some(GroupedEntries::new()),
        }),
        video: Arc::new(StaticSource {
            source: EntrySource::Video,
            entries: None,
        }),
        metadata: Arc::new(StaticSource {
            source: EntrySource::Metadata,
            entries: Some(GroupedEntries::new()),
        }),
    };

    let pipeline = Pipeline::with_sources(config, CategoryTable::standard(), sources);
    let summary = pipeline.run().await.unwrap();
    assert_eq!(summary.user, "missing");

    let doc = read_json(&temp_dir.path().join("docs/channels.json"));
    assert_feed_invariants(&doc);
    assert_eq!(category(&doc, "news").len(), 2);
    assert!(category(&doc, "music").is_empty());
    assert_eq!(summary.entries, 2);
}
