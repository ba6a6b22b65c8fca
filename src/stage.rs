//! Copy classified tracks into the Upload tree.
//!
//! Unique tracks go to `<upload>/<artist_folder>/<file>`, uncertain tracks to
//! `<upload>/_UNCERTAIN/<file>`, duplicates are not copied. Sources are only
//! ever read. Each copy stands alone: a failure is logged and recorded, and
//! the rest of the batch still runs. Failed copies are not retried.
//!
//! Every copy is written to a hidden `.part` file next to its destination and
//! renamed into place once complete, so an interrupted run never leaves a
//! truncated file under a real track name.

use clap::ValueEnum;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, info, warn};

use crate::classify::{Classification, ClassifiedTrack};
use crate::error::{DedupError, Result};
use crate::progress::{Phase, PhaseProgress};

/// Flat review folder for uncertain tracks.
pub const UNCERTAIN_DIR: &str = "_UNCERTAIN";

const PART_PREFIX: &str = ".staging-";
const PART_SUFFIX: &str = ".part";

/// What to do when the destination file already exists (e.g. a re-run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExistingPolicy {
    /// Leave the existing file alone and count it as skipped
    #[default]
    Skip,
    /// Replace the existing file
    Overwrite,
    /// Record a staging error for that file
    Fail,
}

/// Result of a single successful staging attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Copied,
    SkippedExisting,
}

/// Where a classified track should be copied, if anywhere.
pub fn destination(upload_root: &Path, classified: &ClassifiedTrack<'_>) -> Option<PathBuf> {
    let file_name = classified.track.file_name();
    match classified.classification {
        Classification::Unique => Some(
            upload_root
                .join(&classified.track.artist_folder)
                .join(file_name),
        ),
        Classification::Uncertain { .. } => Some(upload_root.join(UNCERTAIN_DIR).join(file_name)),
        Classification::Duplicate { .. } => None,
    }
}

fn staging_error(src: &Path, dst: &Path, source: io::Error) -> DedupError {
    DedupError::Staging {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    }
}

fn on_existing(
    policy: ExistingPolicy,
    src: &Path,
    dst: &Path,
    source: io::Error,
) -> Result<StageOutcome> {
    match policy {
        ExistingPolicy::Skip => Ok(StageOutcome::SkippedExisting),
        _ => Err(staging_error(src, dst, source)),
    }
}

/// Copy `src` to `dst` under `policy`, creating parent directories.
///
/// The data goes to a temporary sibling first. `Overwrite` renames it over
/// `dst`; `Skip` and `Fail` use a no-clobber rename, so a file that appears
/// at `dst` in the meantime is never replaced.
pub fn copy_track(src: &Path, dst: &Path, policy: ExistingPolicy) -> Result<StageOutcome> {
    let err = |e: io::Error| staging_error(src, dst, e);
    let parent = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(err)?;

    if policy != ExistingPolicy::Overwrite && dst.exists() {
        let source = io::Error::new(ErrorKind::AlreadyExists, "destination already exists");
        return on_existing(policy, src, dst, source);
    }

    let mut reader = File::open(src).map_err(err)?;
    let mut part = Builder::new()
        .prefix(PART_PREFIX)
        .suffix(PART_SUFFIX)
        .tempfile_in(parent)
        .map_err(err)?;
    // On any early return the temporary file is dropped and removed.
    io::copy(&mut reader, part.as_file_mut()).map_err(err)?;

    let persisted = match policy {
        ExistingPolicy::Overwrite => part.persist(dst),
        ExistingPolicy::Skip | ExistingPolicy::Fail => part.persist_noclobber(dst),
    };
    match persisted {
        Ok(_) => Ok(StageOutcome::Copied),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            on_existing(policy, src, dst, e.error)
        }
        Err(e) => Err(err(e.error)),
    }
}

/// Counters and failures from one staging pass.
#[derive(Debug, Default)]
pub struct StagingSummary {
    pub copied: usize,
    pub skipped_existing: usize,
    pub failures: Vec<DedupError>,
    /// Artist folders that received (or, in a dry run, would receive) a
    /// unique track
    pub artists: BTreeSet<String>,
    pub dry_run: bool,
}

impl StagingSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Copies classified tracks into an Upload root.
#[derive(Debug, Clone)]
pub struct StagingPipeline {
    upload_root: PathBuf,
    policy: ExistingPolicy,
    dry_run: bool,
}

impl StagingPipeline {
    pub fn new(upload_root: impl Into<PathBuf>, policy: ExistingPolicy) -> Self {
        Self {
            upload_root: upload_root.into(),
            policy,
            dry_run: false,
        }
    }

    /// Compute destinations without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// Stage every unique and uncertain track.
    ///
    /// Only failing to create the Upload root itself is fatal; per-file
    /// failures end up in [`StagingSummary::failures`].
    pub fn stage(&self, classified: &[ClassifiedTrack<'_>]) -> Result<StagingSummary> {
        let mut summary = StagingSummary {
            dry_run: self.dry_run,
            ..Default::default()
        };

        if !self.dry_run {
            fs::create_dir_all(&self.upload_root).map_err(|e| {
                DedupError::config(&self.upload_root, format!("cannot create upload root: {e}"))
            })?;
        }

        let jobs: Vec<(&ClassifiedTrack<'_>, PathBuf)> = classified
            .iter()
            .filter_map(|c| destination(&self.upload_root, c).map(|dst| (c, dst)))
            .collect();
        let mut progress = PhaseProgress::new(Phase::Stage, jobs.len() as u64);
        // Destinations already taken by an earlier track of this batch
        let mut claimed: FxHashSet<PathBuf> = FxHashSet::default();

        for (item, dst) in jobs {
            let is_unique = matches!(item.classification, Classification::Unique);

            if !claimed.insert(dst.clone()) {
                let e = staging_error(
                    &item.track.path,
                    &dst,
                    io::Error::new(
                        ErrorKind::AlreadyExists,
                        "another track in this batch has the same destination",
                    ),
                );
                warn!("{}", e);
                summary.failures.push(e);
            } else if self.dry_run {
                debug!("Would copy {} -> {}", item.track.path.display(), dst.display());
                if is_unique {
                    summary.artists.insert(item.track.artist_folder.clone());
                }
            } else {
                match copy_track(&item.track.path, &dst, self.policy) {
                    Ok(StageOutcome::Copied) => {
                        debug!("Copied {} -> {}", item.track.path.display(), dst.display());
                        summary.copied += 1;
                        if is_unique {
                            summary.artists.insert(item.track.artist_folder.clone());
                        }
                    }
                    Ok(StageOutcome::SkippedExisting) => {
                        debug!("Skipped existing {}", dst.display());
                        summary.skipped_existing += 1;
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!("{}", e);
                        summary.failures.push(e);
                    }
                    Err(e) => return Err(e),
                }
            }

            progress.tick();
        }

        progress.finish(format!(
            "Staged {} files ({} skipped, {} failed)",
            summary.copied,
            summary.skipped_existing,
            summary.failed()
        ));
        info!(
            copied = summary.copied,
            skipped = summary.skipped_existing,
            failed = summary.failed(),
            dry_run = self.dry_run,
            "Staging finished"
        );
        Ok(summary)
    }
}
