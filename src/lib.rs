//! Music library dedup reconciler - shared modules for the binary and tests.

pub mod classify;
pub mod config;
pub mod error;
pub mod filename;
pub mod index;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod safety;
pub mod scan;
pub mod stage;
pub mod transliterate;

pub use error::{DedupError, Result};
