//! Title-keyed index over the existing library.
//!
//! Every library file becomes a [`LibraryEntry`] in the bucket for its
//! normalized title. Buckets keep insertion order because classification
//! resolves ties by taking the first matching candidate. The index is built
//! in one read-only pass and has no mutating API afterwards.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::filename;
use crate::normalize::TextNormalizer;
use crate::progress::{Phase, PhaseProgress};
use crate::scan::{self, ScanOptions};

/// One library file with raw and normalized fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub path: PathBuf,
    pub raw_artist: String,
    pub raw_title: String,
    pub normalized_artist: String,
    pub normalized_title: String,
}

impl LibraryEntry {
    pub fn from_path(path: PathBuf, normalizer: &TextNormalizer) -> Self {
        let parsed = filename::parse(&filename::file_stem(&path));
        Self {
            normalized_artist: normalizer.normalize(&parsed.artist),
            normalized_title: normalizer.normalize(&parsed.title),
            raw_artist: parsed.artist,
            raw_title: parsed.title,
            path,
        }
    }
}

/// Counters gathered while building the index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub files_seen: usize,
    pub entries_indexed: usize,
    /// Files whose normalized title is empty; these can never match
    pub skipped_empty_title: usize,
    pub distinct_titles: usize,
}

/// Normalized title → candidates sharing that title, in insertion order.
#[derive(Debug, Default)]
pub struct TitleIndex {
    buckets: FxHashMap<String, Vec<LibraryEntry>>,
    stats: IndexStats,
}

impl TitleIndex {
    /// Build from entries in the given order. Entries with an empty
    /// normalized title are dropped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = LibraryEntry>,
    {
        let mut buckets: FxHashMap<String, Vec<LibraryEntry>> = FxHashMap::default();
        let mut stats = IndexStats::default();

        for entry in entries {
            stats.files_seen += 1;
            if entry.normalized_title.is_empty() {
                debug!("Not indexing {} (empty title)", entry.path.display());
                stats.skipped_empty_title += 1;
                continue;
            }
            stats.entries_indexed += 1;
            buckets
                .entry(entry.normalized_title.clone())
                .or_default()
                .push(entry);
        }

        stats.distinct_titles = buckets.len();
        Self { buckets, stats }
    }

    /// Candidates for a normalized title, if any were indexed.
    pub fn candidates(&self, normalized_title: &str) -> Option<&[LibraryEntry]> {
        self.buckets
            .get(normalized_title)
            .map(Vec::as_slice)
            .filter(|bucket| !bucket.is_empty())
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Number of distinct normalized titles.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of indexed entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.stats.entries_indexed
    }
}

/// Scan `root` and build the title index.
///
/// A missing root yields an empty index.
pub fn build_index(
    root: &Path,
    normalizer: &TextNormalizer,
    options: &ScanOptions,
) -> Result<TitleIndex> {
    let files = scan::audio_files(root, options)?;
    let total = files.len() as u64;

    let mut progress = PhaseProgress::new(Phase::Index, total);
    let entries: Vec<LibraryEntry> = files
        .into_iter()
        .map(|path| {
            let entry = LibraryEntry::from_path(path, normalizer);
            progress.tick();
            entry
        })
        .collect();

    let index = TitleIndex::from_entries(entries);
    let stats = index.stats();
    progress.finish(format!("Indexed {} library tracks", stats.entries_indexed));

    info!(
        files = stats.files_seen,
        indexed = stats.entries_indexed,
        skipped_empty_title = stats.skipped_empty_title,
        titles = stats.distinct_titles,
        "Library index built"
    );
    Ok(index)
}
