//! Merge engine: five inputs in, one channels document out.
//!
//! Candidates for each category are appended in a fixed precedence order
//! (playlist, video, metadata, curated, user) and then deduplicated by URL
//! with the first occurrence winning, so precedence decides which duplicate
//! survives. Output lists keep candidate order.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use crate::categories::{CategoryDescriptor, CategoryTable};
use crate::local::OverrideMap;
use crate::models::{
    CategoryLists, ChannelDocument, ChannelEntry, EntrySource, FEED_VERSION, GroupedEntries,
};

/// Everything the merge consumes besides the category table
#[derive(Debug, Default)]
pub struct MergeInputs {
    /// Keyed by playlist group
    pub playlist: GroupedEntries,
    /// Keyed by category
    pub video: GroupedEntries,
    /// Keyed by category
    pub metadata: GroupedEntries,
    pub curated: OverrideMap,
    pub user: OverrideMap,
}

/// Counters describing what the merge kept and discarded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub candidates: usize,
    pub kept: usize,
    pub duplicates: usize,
    pub missing_url: usize,
}

impl MergeStats {
    fn absorb(&mut self, other: MergeStats) {
        self.candidates += other.candidates;
        self.kept += other.kept;
        self.duplicates += other.duplicates;
        self.missing_url += other.missing_url;
    }
}

/// Build the channels document. Every category in `table` gets a key.
pub fn merge_feeds(
    table: &CategoryTable,
    inputs: &MergeInputs,
    per_group_limit: usize,
    updated: DateTime<Utc>,
) -> (ChannelDocument, MergeStats) {
    let mut categories = CategoryLists::new();
    let mut stats = MergeStats::default();

    for descriptor in table {
        let candidates = collect_candidates(descriptor, inputs, per_group_limit);
        let (entries, category_stats) = dedup_by_url(candidates);
        debug!(
            category = %descriptor.name,
            kept = category_stats.kept,
            duplicates = category_stats.duplicates,
            "Merged category"
        );
        stats.absorb(category_stats);
        categories.push(descriptor.name.clone(), entries);
    }

    for key in inputs.curated.keys().chain(inputs.user.keys()) {
        if !table.contains(key) {
            debug!(category = %key, "Ignoring override entries for unknown category");
        }
    }

    let document = ChannelDocument {
        updated,
        version: FEED_VERSION.to_string(),
        categories,
    };
    (document, stats)
}

/// Candidate list for one category in source precedence order
fn collect_candidates(
    descriptor: &CategoryDescriptor,
    inputs: &MergeInputs,
    per_group_limit: usize,
) -> Vec<ChannelEntry> {
    let name = descriptor.name.as_str();
    let mut candidates = Vec::new();

    // The limit applies to each group's contribution, not the category total
    for group in &descriptor.playlist_groups {
        if let Some(entries) = inputs.playlist.get(group) {
            candidates.extend(
                entries
                    .iter()
                    .take(per_group_limit)
                    .map(|e| e.clone().with_category(name)),
            );
        }
    }

    for fetched in [&inputs.video, &inputs.metadata] {
        if let Some(entries) = fetched.get(name) {
            candidates.extend(entries.iter().map(|e| e.clone().with_category(name)));
        }
    }

    let overrides = [
        (&inputs.curated, EntrySource::Curated),
        (&inputs.user, EntrySource::User),
    ];
    for (map, source) in overrides {
        if let Some(entries) = map.get(name) {
            candidates.extend(
                entries
                    .iter()
                    .map(|e| e.clone().with_source(source.clone()).with_category(name)),
            );
        }
    }

    candidates
}

/// First-seen-wins dedup on `url`; entries with a blank URL are dropped
pub fn dedup_by_url(candidates: Vec<ChannelEntry>) -> (Vec<ChannelEntry>, MergeStats) {
    let mut stats = MergeStats {
        candidates: candidates.len(),
        ..MergeStats::default()
    };
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for entry in candidates {
        if !entry.has_url() {
            stats.missing_url += 1;
            continue;
        }
        if !seen.insert(entry.url.clone()) {
            stats.duplicates += 1;
            continue;
        }
        kept.push(entry);
    }

    stats.kept = kept.len();
    (kept, stats)
}
