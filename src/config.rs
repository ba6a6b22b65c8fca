//! Command-line and environment configuration.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::scan::ScanOptions;
use crate::stage::ExistingPolicy;

/// Transliteration backend applied before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scheme {
    /// Ordered regex rule table (bundled Crimean Tatar table or --rules)
    #[default]
    Rules,
    /// Generic Unicode-to-ASCII folding
    AnyAscii,
}

#[derive(Parser, Debug)]
#[command(name = "track-dedup")]
#[command(about = "Reconcile downloaded tracks against an existing music library")]
pub struct Args {
    /// Existing library root (read-only)
    #[arg(long, env = "DEDUP_LIBRARY")]
    pub library: PathBuf,

    /// Newly downloaded tracks, one folder per artist (read-only)
    #[arg(long, env = "DEDUP_INCOMING")]
    pub incoming: PathBuf,

    /// Staging root for unique and uncertain tracks
    #[arg(long, env = "DEDUP_UPLOAD", default_value = "Upload")]
    pub upload: PathBuf,

    /// Path of the JSON report
    #[arg(long, env = "DEDUP_REPORT", default_value = "dedup_report.json")]
    pub report: PathBuf,

    /// Transliteration rule table (JSON); the bundled table is used if omitted
    #[arg(long, env = "DEDUP_RULES")]
    pub rules: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Scheme::Rules)]
    pub scheme: Scheme,

    /// Audio file extension to consider (repeatable, case-insensitive)
    #[arg(long = "ext", default_values_t = vec!["mp3".to_string()])]
    pub extensions: Vec<String>,

    /// What to do when a destination file already exists
    #[arg(long, value_enum, default_value_t = ExistingPolicy::Skip)]
    pub on_existing: ExistingPolicy,

    /// Classify and write the report without copying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log-only mode: disable progress bars, print periodic progress lines
    #[arg(long)]
    pub log_only: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub library_root: PathBuf,
    pub incoming_root: PathBuf,
    pub upload_root: PathBuf,
    pub report_path: PathBuf,
    pub rules_path: Option<PathBuf>,
    pub scheme: Scheme,
    pub scan: ScanOptions,
    pub on_existing: ExistingPolicy,
    pub dry_run: bool,
}

impl Config {
    /// Defaults for everything except the two input roots.
    pub fn new(library_root: impl Into<PathBuf>, incoming_root: impl Into<PathBuf>) -> Self {
        Self {
            library_root: library_root.into(),
            incoming_root: incoming_root.into(),
            upload_root: PathBuf::from("Upload"),
            report_path: PathBuf::from("dedup_report.json"),
            rules_path: None,
            scheme: Scheme::default(),
            scan: ScanOptions::default(),
            on_existing: ExistingPolicy::default(),
            dry_run: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            library_root: args.library,
            incoming_root: args.incoming,
            upload_root: args.upload,
            report_path: args.report,
            rules_path: args.rules,
            scheme: args.scheme,
            scan: ScanOptions::new(&args.extensions),
            on_existing: args.on_existing,
            dry_run: args.dry_run,
        }
    }
}
