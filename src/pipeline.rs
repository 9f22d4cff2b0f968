//! Run driver: fetching -> merging -> writing (or reporting on a dry run)
//!
//! Every best-effort step below has already folded its failures into an
//! outcome value; the only errors that escape are ones the run cannot
//! recover from (HTTP client construction, output writes, stdout).

use chrono::Utc;
use serde_json::{Map, Value, json};
use std::fmt;
use std::io::Write;
use thiserror::Error;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::categories::CategoryTable;
use crate::config::Config;
use crate::history::{DEFAULT_URLS, build_history};
use crate::http::HttpError;
use crate::local::{load_history, load_overrides};
use crate::merge::{MergeInputs, merge_feeds};
use crate::models::{ChannelDocument, EntrySource};
use crate::observability::{RunSummary, SourceStatus};
use crate::sources::{SourceOutcome, SourceSet};
use crate::storage::{FeedStorage, StorageError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to set up sources: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to render dry-run sample: {0}")]
    Sample(#[from] serde_json::Error),

    #[error("failed to print dry-run sample: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Fetching,
    Merging,
    Writing,
    Reporting,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Fetching => "fetching",
            RunPhase::Merging => "merging",
            RunPhase::Writing => "writing",
            RunPhase::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

pub struct Pipeline {
    config: Config,
    table: CategoryTable,
    sources: SourceSet,
    storage: FeedStorage,
}

impl Pipeline {
    /// Pipeline over the standard category table and the real HTTP sources
    pub fn new(config: Config) -> Result<Self> {
        let sources = SourceSet::from_config(&config)?;
        Ok(Self::with_sources(config, CategoryTable::standard(), sources))
    }

    pub fn with_sources(config: Config, table: CategoryTable, sources: SourceSet) -> Self {
        let storage = FeedStorage::new(config.output.dir.clone());
        Self {
            config,
            table,
            sources,
            storage,
        }
    }

    /// Run once, printing the dry-run sample (if any) to stdout
    pub async fn run(&self) -> Result<RunSummary> {
        let mut out = std::io::stdout();
        self.run_with_output(&mut out).await
    }

    /// Run once, printing the dry-run sample (if any) to `out`
    pub async fn run_with_output<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let run_id = Uuid::now_v7();
        let span = info_span!("run", %run_id, dry_run = self.config.output.dry_run);
        self.execute(run_id, out).instrument(span).await
    }

    async fn execute<W: Write>(&self, run_id: Uuid, out: &mut W) -> Result<RunSummary> {
        let dry_run = self.config.output.dry_run;

        info!(phase = %RunPhase::Fetching, "Fetching sources");
        let table = &self.table;
        let (playlist, video, metadata) = tokio::join!(
            self.sources.playlist.fetch(table),
            self.sources.video.fetch(table),
            self.sources.metadata.fetch(table),
        );
        let history_path = self.config.output.history_path();
        let (curated, user, previous_history) = tokio::join!(
            load_overrides(&self.config.local.curated_file),
            load_overrides(&self.config.local.user_file),
            load_history(&history_path),
        );

        let sources: Vec<SourceStatus> = [
            (&self.sources.playlist, &playlist),
            (&self.sources.video, &video),
            (&self.sources.metadata, &metadata),
        ]
        .into_iter()
        .map(|(source, outcome)| source_status(source.source(), outcome))
        .collect();
        let curated_status = curated.status();
        let user_status = user.status();

        info!(phase = %RunPhase::Merging, "Merging sources");
        let inputs = MergeInputs {
            playlist: playlist.into_entries(),
            video: video.into_entries(),
            metadata: metadata.into_entries(),
            curated: curated.into_data(),
            user: user.into_data(),
        };
        let (document, stats) = merge_feeds(
            table,
            &inputs,
            self.config.merge.per_group_limit,
            Utc::now(),
        );
        let history = build_history(
            &DEFAULT_URLS,
            previous_history.as_loaded(),
            self.config.history.max_entries,
        );

        let mut written = Vec::new();
        if dry_run {
            info!(phase = %RunPhase::Reporting, "Dry run, printing sample instead of writing");
            let sample = render_sample(&document, &history, self.config.output.sample_size);
            serde_json::to_writer_pretty(&mut *out, &sample)?;
            writeln!(out)?;
        } else {
            info!(phase = %RunPhase::Writing, dir = %self.storage.dir().display(), "Writing documents");
            let channels = self
                .storage
                .write_json(&self.config.output.channels_file, &document)
                .await?;
            let history_file = self
                .storage
                .write_json(&self.config.output.history_file, &history)
                .await?;
            written.push(channels.path);
            written.push(history_file.path);
        }

        Ok(RunSummary {
            run_id,
            dry_run,
            sources,
            curated: curated_status,
            user: user_status,
            categories: document.categories.len(),
            entries: document.categories.total_entries(),
            duplicates: stats.duplicates,
            missing_url: stats.missing_url,
            history_entries: history.len(),
            written,
        })
    }
}

fn source_status(source: EntrySource, outcome: &SourceOutcome) -> SourceStatus {
    SourceStatus {
        source,
        status: outcome.status(),
        entries: outcome.entry_count(),
    }
}

/// Dry-run report: per-category counts plus the first few entries of each
/// non-empty category
pub fn render_sample(document: &ChannelDocument, history: &[String], per_category: usize) -> Value {
    let mut counts = Map::new();
    let mut sample = Map::new();

    for (name, entries) in document.categories.iter() {
        counts.insert(name.to_string(), json!(entries.len()));
        if !entries.is_empty() {
            let head = &entries[..entries.len().min(per_category)];
            sample.insert(name.to_string(), json!(head));
        }
    }

    json!({
        "updated": document.updated,
        "version": document.version,
        "total_entries": document.categories.total_entries(),
        "counts": counts,
        "sample": sample,
        "history_entries": history.len(),
    })
}
