//! Recursive audio file discovery for the library and incoming roots.
//!
//! Walks with `walkdir` (explicit stack, no recursion limit). Entries are
//! sorted by file name so runs are reproducible, but nothing downstream
//! depends on the order.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{DedupError, Result};

/// Which files count as audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Lowercase extensions without the leading dot
    extensions: Vec<String>,
}

impl ScanOptions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Case-insensitive extension match.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new(["mp3"])
    }
}

/// Check a root before any work is done.
///
/// A missing root is allowed (it scans as empty). A root that exists but is
/// not a listable directory is a configuration error.
pub fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Ok(());
    }
    if !root.is_dir() {
        return Err(DedupError::config(root, "not a directory"));
    }
    fs::read_dir(root)
        .map(|_| ())
        .map_err(|e| DedupError::config(root, format!("cannot be read: {e}")))
}

/// All audio files under `root`, recursively.
pub fn audio_files(root: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        warn!("{} does not exist, treating it as empty", root.display());
        return Ok(Vec::new());
    }
    check_root(root)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(DedupError::config(root, format!("cannot be read: {e}")));
            }
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && options.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} audio files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"ID3").unwrap();
    }

    #[test]
    fn test_extension_matching() {
        let options = ScanOptions::new([".MP3", "flac"]);
        assert_eq!(options.extensions(), ["mp3", "flac"]);
        assert!(options.matches(Path::new("a - b.mp3")));
        assert!(options.matches(Path::new("a - b.Mp3")));
        assert!(options.matches(Path::new("x.flac")));
        assert!(!options.matches(Path::new("cover.jpg")));
        assert!(!options.matches(Path::new("mp3")));
    }

    #[test]
    fn test_recursive_scan() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A/A - One.mp3");
        touch(dir.path(), "A/deep/er/A - Two.MP3");
        touch(dir.path(), "B/cover.jpg");
        touch(dir.path(), "B - Three.mp3");

        let files = audio_files(dir.path(), &ScanOptions::default()).unwrap();
        let mut names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["A - One.mp3", "A - Two.MP3", "B - Three.mp3"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(check_root(&missing).is_ok());
        assert!(audio_files(&missing, &ScanOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_file_root_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.mp3");
        let err = audio_files(&dir.path().join("file.mp3"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, DedupError::Configuration { .. }));
    }
}
