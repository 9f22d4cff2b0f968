//! Tracing setup and the end-of-run summary

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::models::EntrySource;

const DEFAULT_FILTER: &str = "info";

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
/// Logs go to stderr so a dry-run sample on stdout stays clean.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Status of one upstream in a finished run
#[derive(Debug, Clone)]
pub struct SourceStatus {
    pub source: EntrySource,
    pub status: &'static str,
    pub entries: usize,
}

/// Snapshot of one pipeline run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub sources: Vec<SourceStatus>,
    pub curated: &'static str,
    pub user: &'static str,
    pub categories: usize,
    pub entries: usize,
    pub duplicates: usize,
    pub missing_url: usize,
    pub history_entries: usize,
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn source_status(&self, source: &EntrySource) -> Option<&SourceStatus> {
        self.sources.iter().find(|s| &s.source == source)
    }

    pub fn log(&self) {
        for source in &self.sources {
            tracing::info!(
                run_id = %self.run_id,
                source = %source.source,
                status = source.status,
                entries = source.entries,
                "Source result"
            );
        }

        tracing::info!(
            run_id = %self.run_id,
            dry_run = self.dry_run,
            curated = self.curated,
            user = self.user,
            categories = self.categories,
            entries = self.entries,
            duplicates = self.duplicates,
            missing_url = self.missing_url,
            history_entries = self.history_entries,
            files_written = self.written.len(),
            "Run complete"
        );
    }
}
