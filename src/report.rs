//! JSON report of one reconciliation run.
//!
//! The report is the only machine-readable output. Paths in descriptors are
//! relative to the root they came from (incoming for the track itself,
//! library for a matched entry) and use `/` separators.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::classify::{Classification, ClassifiedTrack, IncomingTrack};
use crate::error::{DedupError, Result};
use crate::index::LibraryEntry;
use crate::matcher::ArtistMatch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackDescriptor {
    pub file: String,
    pub artist: String,
    pub title: String,
    pub artist_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateDescriptor {
    #[serde(flatten)]
    pub track: TrackDescriptor,
    pub existing_file: String,
    pub existing_artist: String,
    pub existing_title: String,
    pub match_reason: ArtistMatch,
}

/// A library entry that shared the title of an uncertain track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotentialMatch {
    pub file: String,
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UncertainDescriptor {
    #[serde(flatten)]
    pub track: TrackDescriptor,
    pub potential_matches: Vec<PotentialMatch>,
}

/// Write-once summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    timestamp: DateTime<Utc>,
    unique: Vec<TrackDescriptor>,
    duplicates: Vec<DuplicateDescriptor>,
    uncertain: Vec<UncertainDescriptor>,
    artists: BTreeSet<String>,
}

fn relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn describe_track(track: &IncomingTrack, incoming_root: &Path) -> TrackDescriptor {
    TrackDescriptor {
        file: relative(&track.path, incoming_root),
        artist: track.raw_artist.clone(),
        title: track.raw_title.clone(),
        artist_folder: track.artist_folder.clone(),
    }
}

fn describe_entry(entry: &LibraryEntry, library_root: &Path) -> PotentialMatch {
    PotentialMatch {
        file: relative(&entry.path, library_root),
        artist: entry.raw_artist.clone(),
        title: entry.raw_title.clone(),
    }
}

impl DedupReport {
    /// Build the report from the full classification of a run.
    ///
    /// `artists` are the folders that received new files during staging.
    pub fn build(
        classified: &[ClassifiedTrack<'_>],
        artists: BTreeSet<String>,
        incoming_root: &Path,
        library_root: &Path,
    ) -> Self {
        let mut unique = Vec::new();
        let mut duplicates = Vec::new();
        let mut uncertain = Vec::new();

        for item in classified {
            let track = describe_track(&item.track, incoming_root);
            match item.classification {
                Classification::Unique => unique.push(track),
                Classification::Duplicate { entry, reason } => {
                    let existing = describe_entry(entry, library_root);
                    duplicates.push(DuplicateDescriptor {
                        track,
                        existing_file: existing.file,
                        existing_artist: existing.artist,
                        existing_title: existing.title,
                        match_reason: reason,
                    });
                }
                Classification::Uncertain { candidates } => {
                    uncertain.push(UncertainDescriptor {
                        track,
                        potential_matches: candidates
                            .iter()
                            .map(|c| describe_entry(c, library_root))
                            .collect(),
                    });
                }
            }
        }

        Self {
            timestamp: Utc::now(),
            unique,
            duplicates,
            uncertain,
            artists,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn unique(&self) -> &[TrackDescriptor] {
        &self.unique
    }

    pub fn duplicates(&self) -> &[DuplicateDescriptor] {
        &self.duplicates
    }

    pub fn uncertain(&self) -> &[UncertainDescriptor] {
        &self.uncertain
    }

    pub fn artists(&self) -> &BTreeSet<String> {
        &self.artists
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize as pretty JSON to `path`, creating its parent directory.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let report_err = |reason: String| DedupError::Report {
            path: path.to_path_buf(),
            reason,
        };

        let json = self.to_json().map_err(|e| report_err(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| report_err(e.to_string()))?;
        }
        fs::write(path, json).map_err(|e| report_err(e.to_string()))
    }
}
