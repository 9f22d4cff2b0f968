use async_trait::async_trait;
use thiserror::Error;

use crate::categories::CategoryTable;
use crate::http::HttpError;
use crate::models::{EntrySource, GroupedEntries};

/// Source errors. Always recovered by the caller.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// A request for one grouping key that failed without sinking the source
#[derive(Debug)]
pub struct KeyFailure {
    pub key: String,
    pub error: SourceError,
}

/// Entries a source produced plus the keys it could not fetch
#[derive(Debug, Default)]
pub struct FetchReport {
    pub entries: GroupedEntries,
    pub failures: Vec<KeyFailure>,
}

impl FetchReport {
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Explicit result of a best-effort fetch.
///
/// Keeps "nothing found", "not configured" and "request failed" apart for logs
/// and tests, while [`SourceOutcome::into_entries`] gives the merge the empty
/// default it needs.
#[derive(Debug)]
pub enum SourceOutcome {
    Fetched(FetchReport),
    Skipped { reason: String },
    Failed(SourceError),
}

impl SourceOutcome {
    pub fn fetched(entries: GroupedEntries) -> Self {
        SourceOutcome::Fetched(FetchReport {
            entries,
            failures: Vec::new(),
        })
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        SourceOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, SourceOutcome::Fetched(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SourceOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed(_))
    }

    pub fn entry_count(&self) -> usize {
        match self {
            SourceOutcome::Fetched(report) => report.entry_count(),
            _ => 0,
        }
    }

    /// Short status label for logs and run summaries
    pub fn status(&self) -> &'static str {
        match self {
            SourceOutcome::Fetched(report) if report.failures.is_empty() => "fetched",
            SourceOutcome::Fetched(_) => "partial",
            SourceOutcome::Skipped { .. } => "skipped",
            SourceOutcome::Failed(_) => "failed",
        }
    }

    pub fn into_entries(self) -> GroupedEntries {
        match self {
            SourceOutcome::Fetched(report) => report.entries,
            SourceOutcome::Skipped { .. } | SourceOutcome::Failed(_) => GroupedEntries::new(),
        }
    }
}

/// One external listing source.
///
/// Implementations never fail the run: every problem is folded into the
/// returned [`SourceOutcome`].
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// Tag stamped on every entry this source produces
    fn source(&self) -> EntrySource;

    /// Fetch entries keyed by playlist group or category name
    async fn fetch(&self, table: &CategoryTable) -> SourceOutcome;
}
