//! "Artist - Title" filename convention.

use std::path::Path;

/// Separator between artist and title in a file stem.
pub const SEPARATOR: &str = " - ";

/// Raw (un-normalized) fields parsed from a file stem.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedName {
    pub artist: String,
    pub title: String,
}

/// Split a stem on the first `" - "`.
///
/// A title that itself contains the separator keeps it ("A - B - C" gives
/// artist "A", title "B - C"). Without a separator the artist is empty and
/// the whole trimmed stem is the title.
pub fn parse(stem: &str) -> ParsedName {
    match stem.split_once(SEPARATOR) {
        Some((artist, title)) => ParsedName {
            artist: artist.trim().to_string(),
            title: title.trim().to_string(),
        },
        None => ParsedName {
            artist: String::new(),
            title: stem.trim().to_string(),
        },
    }
}

/// File name without its extension, lossily decoded.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
