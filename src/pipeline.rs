//! End-to-end reconciliation run.
//!
//! Phases run strictly in sequence: validate configuration, index the
//! library, scan and classify incoming tracks, stage, then write the report.
//! Any fatal error stops the run before a report exists.

use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::classify::{classify_all, IncomingTrack};
use crate::config::{Config, Scheme};
use crate::error::Result;
use crate::index::{build_index, IndexStats};
use crate::normalize::TextNormalizer;
use crate::progress::{Phase, PhaseProgress};
use crate::report::DedupReport;
use crate::safety::validate_output_path;
use crate::scan::{audio_files, check_root};
use crate::stage::{StagingPipeline, StagingSummary};
use crate::transliterate::{AnyAscii, RuleTable, Transliterate};

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub report: DedupReport,
    pub staging: StagingSummary,
    pub index_stats: IndexStats,
    pub elapsed: Duration,
}

/// Build the configured transliteration backend.
pub fn load_transliterator(config: &Config) -> Result<Box<dyn Transliterate>> {
    match config.scheme {
        Scheme::AnyAscii => {
            if config.rules_path.is_some() {
                warn!("--rules is ignored with the any-ascii scheme");
            }
            Ok(Box::new(AnyAscii))
        }
        Scheme::Rules => {
            let table = match &config.rules_path {
                Some(path) => RuleTable::load(path)?,
                None => RuleTable::builtin()?,
            };
            info!(
                name = table.name(),
                version = table.version(),
                rules = table.len(),
                "Loaded transliteration rules"
            );
            Ok(Box::new(table))
        }
    }
}

/// Reject configurations that would write into a source tree.
fn validate(config: &Config) -> Result<()> {
    check_root(&config.library_root)?;
    check_root(&config.incoming_root)?;

    let protected = [config.library_root.as_path(), config.incoming_root.as_path()];
    validate_output_path(&config.upload_root, &protected)?;
    validate_output_path(&config.report_path, &protected)?;
    Ok(())
}

/// Run one full reconciliation.
pub fn run(config: &Config) -> Result<RunSummary> {
    let start = Instant::now();
    validate(config)?;

    let normalizer = TextNormalizer::from_boxed(load_transliterator(config)?);

    let index = build_index(&config.library_root, &normalizer, &config.scan)?;

    let spinner = PhaseProgress::spinner(Phase::Scan);
    let tracks = audio_files(&config.incoming_root, &config.scan)?
        .into_iter()
        .map(|path| IncomingTrack::from_path(path, &normalizer))
        .collect::<Result<Vec<_>>>()?;
    spinner.finish(format!("Found {} incoming tracks", tracks.len()));
    info!(tracks = tracks.len(), "Scanned incoming tracks");

    let classified = classify_all(tracks, &index);

    let staging = StagingPipeline::new(&config.upload_root, config.on_existing)
        .dry_run(config.dry_run)
        .stage(&classified)?;

    let report = DedupReport::build(
        &classified,
        staging.artists.clone(),
        &config.incoming_root,
        &config.library_root,
    );
    report.write_to_file(&config.report_path)?;
    info!(path = %config.report_path.display(), "Report written");

    Ok(RunSummary {
        report,
        staging,
        index_stats: index.stats(),
        elapsed: start.elapsed(),
    })
}
