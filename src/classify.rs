//! Per-track duplicate classification against the frozen title index.
//!
//! Each incoming track gets exactly one of:
//! - `Unique`: no library bucket for its normalized title
//! - `Duplicate`: the first candidate in the bucket whose artist matches
//! - `Uncertain`: the title collided but no candidate's artist matched
//!
//! "First match wins" is a plain early-exit scan in bucket order; there is no
//! best-score search among later candidates.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::error::{DedupError, Result};
use crate::filename;
use crate::index::{LibraryEntry, TitleIndex};
use crate::matcher::{match_artists, ArtistMatch};
use crate::normalize::TextNormalizer;
use crate::progress::{Phase, PhaseProgress};

/// A newly downloaded file to reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingTrack {
    pub path: PathBuf,
    pub raw_artist: String,
    pub raw_title: String,
    pub normalized_artist: String,
    pub normalized_title: String,
    /// Name of the directory directly containing the file; only used to
    /// choose the staging destination, never for matching
    pub artist_folder: String,
}

impl IncomingTrack {
    pub fn from_path(path: PathBuf, normalizer: &TextNormalizer) -> Result<Self> {
        if path.file_name().is_none() {
            return Err(DedupError::Classification {
                path,
                reason: "path has no file name".to_string(),
            });
        }
        let artist_folder = match path.parent().and_then(|p| p.file_name()) {
            Some(folder) => folder.to_string_lossy().into_owned(),
            None => {
                return Err(DedupError::Classification {
                    path,
                    reason: "file has no parent directory".to_string(),
                })
            }
        };

        let parsed = filename::parse(&filename::file_stem(&path));
        Ok(Self {
            normalized_artist: normalizer.normalize(&parsed.artist),
            normalized_title: normalizer.normalize(&parsed.title),
            raw_artist: parsed.artist,
            raw_title: parsed.title,
            artist_folder,
            path,
        })
    }

    /// Original file name, extension included.
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }
}

/// Outcome for one incoming track, borrowing from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    Unique,
    Duplicate {
        entry: &'a LibraryEntry,
        reason: ArtistMatch,
    },
    Uncertain {
        candidates: &'a [LibraryEntry],
    },
}

impl Classification<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Unique => "unique",
            Classification::Duplicate { .. } => "duplicate",
            Classification::Uncertain { .. } => "uncertain",
        }
    }
}

/// Classify one track. Pure: the index is only read.
pub fn classify<'a>(track: &IncomingTrack, index: &'a TitleIndex) -> Classification<'a> {
    let Some(candidates) = index.candidates(&track.normalized_title) else {
        return Classification::Unique;
    };

    for entry in candidates {
        if let Some(reason) = match_artists(&track.normalized_artist, &entry.normalized_artist) {
            return Classification::Duplicate { entry, reason };
        }
    }

    Classification::Uncertain { candidates }
}

/// A track paired with its classification.
#[derive(Debug, Clone)]
pub struct ClassifiedTrack<'a> {
    pub track: IncomingTrack,
    pub classification: Classification<'a>,
}

/// Classify a whole batch against the same index.
pub fn classify_all(tracks: Vec<IncomingTrack>, index: &TitleIndex) -> Vec<ClassifiedTrack<'_>> {
    let mut progress = PhaseProgress::new(Phase::Classify, tracks.len() as u64);

    let classified: Vec<ClassifiedTrack<'_>> = tracks
        .into_iter()
        .map(|track| {
            let classification = classify(&track, index);
            progress.tick();
            ClassifiedTrack {
                track,
                classification,
            }
        })
        .collect();

    progress.finish(format!("Classified {} tracks", classified.len()));
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::artists_match;
    use crate::transliterate::RuleTable;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(RuleTable::builtin().unwrap())
    }

    fn library(paths: &[&str]) -> TitleIndex {
        let n = normalizer();
        TitleIndex::from_entries(
            paths
                .iter()
                .map(|p| LibraryEntry::from_path(PathBuf::from(p), &n)),
        )
    }

    fn incoming(path: &str) -> IncomingTrack {
        IncomingTrack::from_path(PathBuf::from(path), &normalizer()).unwrap()
    }

    #[test]
    fn test_incoming_fields() {
        let track = incoming("/downloads/Servet Ablayev/Сервет Аблаев - Ант.mp3");
        assert_eq!(track.artist_folder, "Servet Ablayev");
        assert_eq!(track.raw_artist, "Сервет Аблаев");
        assert_eq!(track.normalized_artist, "servet ablayev");
        assert_eq!(track.normalized_title, "ant");
        assert_eq!(track.file_name(), "Сервет Аблаев - Ант.mp3");
    }

    #[test]
    fn test_incoming_without_file_name() {
        let err = IncomingTrack::from_path(PathBuf::from("/"), &normalizer()).unwrap_err();
        assert!(matches!(err, DedupError::Classification { .. }));
    }

    #[test]
    fn test_unique_when_title_unknown() {
        let index = library(&["/lib/Servet Ablayev - Ant.mp3"]);
        let track = incoming("/dl/X/Servet Ablayev - Yol.mp3");
        assert_eq!(classify(&track, &index), Classification::Unique);
    }

    #[test]
    fn test_missing_artist_is_never_duplicate() {
        let index = library(&["/lib/Ave Mariya.mp3", "/lib/Zera - Ave Mariya.mp3"]);
        let track = incoming("/dl/Misc/Ave Mariya.mp3");
        assert_eq!(track.normalized_artist, "");
        match classify(&track, &index) {
            Classification::Uncertain { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected uncertain, got {other:?}"),
        }

        let empty = library(&[]);
        assert_eq!(classify(&track, &empty), Classification::Unique);
    }

    #[test]
    fn test_cyrillic_spelling_is_duplicate_of_latin() {
        let index = library(&["/lib/Servet Ablayev/Servet Ablayev - Ant.mp3"]);
        let track = incoming("/dl/Servet Ablayev/Сервет Аблаев - Ант.mp3");
        match classify(&track, &index) {
            Classification::Duplicate { entry, reason } => {
                assert_eq!(entry.raw_artist, "Servet Ablayev");
                assert_eq!(reason, ArtistMatch::Exact);
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_featured_credit_is_duplicate() {
        let index = library(&["/lib/Rustam - Yaz.mp3"]);
        let track = incoming("/dl/Rustam/DJ Rustam feat. Aysel - Yaz.mp3");
        assert!(matches!(
            classify(&track, &index),
            Classification::Duplicate {
                reason: ArtistMatch::Containment,
                ..
            }
        ));
    }

    #[test]
    fn test_shared_first_name_is_duplicate() {
        let index = library(&["/lib/Arsen Osmanov - Sevgi.mp3"]);
        let track = incoming("/dl/Arsen/Arsen Bekirov - Sevgi.mp3");
        assert!(matches!(
            classify(&track, &index),
            Classification::Duplicate {
                reason: ArtistMatch::TokenOverlap { overlap: 1, min_size: 2 },
                ..
            }
        ));
    }

    #[test]
    fn test_first_match_wins() {
        let index = library(&[
            "/lib/a/Zera Kurtseitova - Yol.mp3",
            "/lib/b/Rustam - Yol.mp3",
            "/lib/c/Rustam Memetov - Yol.mp3",
        ]);
        let track = incoming("/dl/Rustam/Rustam Memetov - Yol.mp3");
        match classify(&track, &index) {
            Classification::Duplicate { entry, reason } => {
                // "rustam" precedes the exact match and wins by containment
                assert_eq!(entry.path, PathBuf::from("/lib/b/Rustam - Yol.mp3"));
                assert_eq!(reason, ArtistMatch::Containment);
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_uncertain_holds_whole_bucket() {
        let index = library(&["/lib/Zera - Yol.mp3", "/lib/Mamut - Yol.mp3"]);
        let track = incoming("/dl/Enver/Enver Izmaylov - Yol.mp3");
        match classify(&track, &index) {
            Classification::Uncertain { candidates } => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates
                    .iter()
                    .all(|c| !artists_match(&track.normalized_artist, &c.normalized_artist)));
            }
            other => panic!("expected uncertain, got {other:?}"),
        }
    }

    #[test]
    fn test_classification_properties() {
        let index = library(&[
            "/lib/Servet Ablayev - Ant.mp3",
            "/lib/Zera - Yol.mp3",
            "/lib/Rustam - Yol.mp3",
            "/lib/Ave Mariya.mp3",
            "/lib/Arsen Osmanov - Sevgi.mp3",
        ]);
        let tracks = [
            "/dl/a/Сервет Аблаев - Ант.mp3",
            "/dl/a/Enver - Yol.mp3",
            "/dl/a/DJ Rustam - Yol.mp3",
            "/dl/a/Ave Mariya.mp3",
            "/dl/a/Arsen Bekirov - Sevgi.mp3",
            "/dl/a/Nobody - Nothing.mp3",
            "/dl/a/!!!.mp3",
        ];
        for path in tracks {
            let track = incoming(path);
            match classify(&track, &index) {
                Classification::Unique => {
                    assert!(index.candidates(&track.normalized_title).is_none());
                }
                Classification::Duplicate { entry, .. } => {
                    assert!(artists_match(&track.normalized_artist, &entry.normalized_artist));
                    assert_eq!(entry.normalized_title, track.normalized_title);
                }
                Classification::Uncertain { candidates } => {
                    assert!(!candidates.is_empty());
                    assert!(candidates
                        .iter()
                        .all(|c| !artists_match(&track.normalized_artist, &c.normalized_artist)));
                }
            }
        }
    }

    #[test]
    fn test_classify_all_is_order_independent() {
        let index = library(&["/lib/Zera - Yol.mp3", "/lib/Servet Ablayev - Ant.mp3"]);
        let paths = ["/dl/a/Zera - Yol.mp3", "/dl/b/Enver - Yol.mp3", "/dl/c/X - New.mp3"];

        let forward = classify_all(paths.iter().map(|p| incoming(p)).collect(), &index);
        let backward = classify_all(paths.iter().rev().map(|p| incoming(p)).collect(), &index);

        fn labels(v: &[ClassifiedTrack<'_>]) -> Vec<(PathBuf, &'static str)> {
            let mut out: Vec<_> = v
                .iter()
                .map(|c| (c.track.path.clone(), c.classification.label()))
                .collect();
            out.sort();
            out
        }
        assert_eq!(labels(&forward), labels(&backward));
        assert_eq!(forward[0].classification.label(), "duplicate");
        assert_eq!(forward[1].classification.label(), "uncertain");
        assert_eq!(forward[2].classification.label(), "unique");
    }
}
