//! Progress display for the long pipeline phases.
//!
//! Interactive runs get `indicatif` bars on stderr. In log-only mode the bars
//! are hidden and each phase emits a `tracing` line every [`LOG_INTERVAL`]
//! items instead, which keeps output tail-friendly.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub const LOG_INTERVAL: u64 = 200;

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})";

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Run time for the console summary: `850ms`, `12.4s`, `3.2m`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    match secs {
        s if s < 1.0 => format!("{}ms", d.as_millis()),
        s if s < 60.0 => format!("{:.1}s", s),
        s => format!("{:.1}m", s / 60.0),
    }
}

/// Pipeline phases that report per-item progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Index,
    /// Incoming scan; the total is unknown up front
    Scan,
    Classify,
    Stage,
}

impl Phase {
    /// Short tag used in log-only lines.
    pub fn tag(self) -> &'static str {
        match self {
            Phase::Index => "index",
            Phase::Scan => "scan",
            Phase::Classify => "classify",
            Phase::Stage => "stage",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Phase::Index => "Indexing library",
            Phase::Scan => "Scanning incoming tracks",
            Phase::Classify => "Classifying",
            Phase::Stage => "Staging",
        }
    }
}

/// Whether a log-only line is due after `current` of `total` items.
fn log_due(current: u64, total: u64) -> bool {
    total > 0 && (current % LOG_INTERVAL == 0 || current == total)
}

/// Progress of one phase: a bar when interactive, log lines otherwise.
pub struct PhaseProgress {
    phase: Phase,
    bar: ProgressBar,
    current: u64,
    total: u64,
}

impl PhaseProgress {
    pub fn new(phase: Phase, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            bar.set_style(style);
        }
        bar.set_message(phase.message());
        Self {
            phase,
            bar,
            current: 0,
            total,
        }
    }

    /// Record one finished item.
    pub fn tick(&mut self) {
        self.current += 1;
        self.bar.inc(1);
        if is_log_only() && log_due(self.current, self.total) {
            let pct = 100.0 * self.current as f64 / self.total as f64;
            info!(
                "[{}] {}/{} ({:.1}%)",
                self.phase.tag(),
                self.current,
                self.total,
                pct
            );
        }
    }

    /// Spinner for a phase whose size is not known yet.
    pub fn spinner(phase: Phase) -> Self {
        let bar = ProgressBar::new_spinner();
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            let style = ProgressStyle::default_spinner()
                .template("{msg} {spinner} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        bar.set_message(phase.message());
        Self {
            phase,
            bar,
            current: 0,
            total: 0,
        }
    }

    pub fn finish(&self, msg: String) {
        if is_log_only() && self.total == 0 {
            info!("[{}] {}", self.phase.tag(), msg);
        }
        self.bar.finish_with_message(msg);
    }
}
