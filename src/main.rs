use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use track_dedup::config::{Args, Config};
use track_dedup::pipeline::run;
use track_dedup::progress::{format_duration, set_log_only};

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    set_log_only(args.log_only);

    let config = Config::from(args);
    println!("Library:  {:?}", config.library_root);
    println!("Incoming: {:?}", config.incoming_root);
    if config.dry_run {
        println!("Dry run: nothing will be copied");
    }

    let summary = run(&config).with_context(|| {
        format!(
            "Reconciliation of {:?} against {:?} failed",
            config.incoming_root, config.library_root
        )
    })?;

    let report = &summary.report;
    let staging = &summary.staging;

    if !report.duplicates().is_empty() {
        println!("\nDuplicates (already in library):");
        println!("{:-<80}", "");
        for dup in report.duplicates() {
            println!(
                "  {} == {} [{}]",
                dup.track.file, dup.existing_file, dup.match_reason
            );
        }
    }

    if !report.uncertain().is_empty() {
        println!("\nUncertain (same title, different artist):");
        println!("{:-<80}", "");
        for item in report.uncertain() {
            println!("  {}", item.track.file);
            for candidate in &item.potential_matches {
                println!("      ? {}", candidate.file);
            }
        }
    }

    if !report.unique().is_empty() {
        println!("\nNew tracks:");
        println!("{:-<80}", "");
        for track in report.unique() {
            println!("  {}", track.file);
        }
    }

    println!("\n{:=<60}", "");
    println!("Reconciliation complete!");
    println!("  Library tracks indexed: {}", summary.index_stats.entries_indexed);
    println!("  Unique:     {}", report.unique().len());
    println!("  Duplicates: {}", report.duplicates().len());
    println!("  Uncertain:  {}", report.uncertain().len());
    if staging.dry_run {
        println!("  Would copy into: {:?}", config.upload_root);
    } else {
        println!(
            "  Copied: {} (skipped existing: {}, failed: {})",
            staging.copied,
            staging.skipped_existing,
            staging.failed()
        );
        println!("  Upload root: {:?}", config.upload_root);
    }
    if !report.artists().is_empty() {
        let artists: Vec<&str> = report.artists().iter().map(String::as_str).collect();
        println!("  Artists: {}", artists.join(", "));
    }
    println!("  Report: {:?}", config.report_path);
    println!("  Elapsed: {}", format_duration(summary.elapsed));
    println!("{:=<60}", "");

    if !staging.failures.is_empty() {
        println!("\nFailed copies:");
        for failure in &staging.failures {
            println!("  {}", failure);
        }
    }

    Ok(())
}
