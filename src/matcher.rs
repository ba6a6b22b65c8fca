//! Fuzzy comparison of two normalized artist strings.
//!
//! The comparison must be symmetric: swapping the arguments never changes the
//! outcome or the reported reason.
//!
//! Known false positive: a single shared significant token between two
//! two-word names is enough ("arsen bekirov" vs "arsen osmanov" match).
//! Such pairs land in the duplicates list of the report where they can be
//! reviewed.

use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

/// Tokens shorter than this are ignored by the overlap test (initials,
/// "dj", "ft", connector words).
pub const MIN_TOKEN_CHARS: usize = 3;

/// Why two artists were considered the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtistMatch {
    /// Identical normalized strings
    Exact,
    /// One name is a substring of the other ("dj rustam feat aysel" / "rustam")
    Containment,
    /// At least half of the smaller significant-token set is shared
    TokenOverlap { overlap: usize, min_size: usize },
}

impl fmt::Display for ArtistMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtistMatch::Exact => write!(f, "exact"),
            ArtistMatch::Containment => write!(f, "containment"),
            ArtistMatch::TokenOverlap { overlap, min_size } => {
                write!(f, "token overlap {}/{}", overlap, min_size)
            }
        }
    }
}

fn significant_tokens(artist: &str) -> FxHashSet<&str> {
    artist
        .split(' ')
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

/// Compare two already-normalized artists, returning the reason they match.
///
/// An empty artist never matches anything, including another empty artist.
pub fn match_artists(a: &str, b: &str) -> Option<ArtistMatch> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    if a == b {
        return Some(ArtistMatch::Exact);
    }

    if a.contains(b) || b.contains(a) {
        return Some(ArtistMatch::Containment);
    }

    let tokens_a = significant_tokens(a);
    let tokens_b = significant_tokens(b);
    let min_size = tokens_a.len().min(tokens_b.len());
    if min_size == 0 {
        return None;
    }

    let overlap = tokens_a.intersection(&tokens_b).count();
    // overlap / min_size >= 0.5, kept in integers
    if overlap * 2 >= min_size {
        Some(ArtistMatch::TokenOverlap { overlap, min_size })
    } else {
        None
    }
}

/// Boolean form of [`match_artists`].
pub fn artists_match(a: &str, b: &str) -> bool {
    match_artists(a, b).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTISTS: &[&str] = &[
        "",
        "rustam",
        "dj rustam feat aysel",
        "arsen bekirov",
        "arsen osmanov",
        "servet ablayev",
        "ablayev",
        "a b c",
        "dj mc",
        "zera kurtseitova",
        "kurtseitova zera",
        "enver izmaylov ensemble",
        "izmaylov",
        "ali",
        "alim",
        "the qirim band",
        "qirim",
    ];

    #[test]
    fn test_empty_artist_never_matches() {
        assert!(!artists_match("", ""));
        for other in ARTISTS {
            assert!(!artists_match("", other));
            assert!(!artists_match(other, ""));
        }
    }

    #[test]
    fn test_exact() {
        assert_eq!(match_artists("rustam", "rustam"), Some(ArtistMatch::Exact));
    }

    #[test]
    fn test_containment() {
        // Multi-credit name containing the library artist
        assert_eq!(
            match_artists("dj rustam feat aysel", "rustam"),
            Some(ArtistMatch::Containment)
        );
        assert_eq!(
            match_artists("rustam", "dj rustam feat aysel"),
            Some(ArtistMatch::Containment)
        );
        // Substring, not word, containment
        assert!(artists_match("ali", "alim"));
    }

    #[test]
    fn test_single_shared_token_is_a_match() {
        // Known false positive, kept on purpose
        assert_eq!(
            match_artists("arsen bekirov", "arsen osmanov"),
            Some(ArtistMatch::TokenOverlap {
                overlap: 1,
                min_size: 2
            })
        );
    }

    #[test]
    fn test_reordered_names_match() {
        assert_eq!(
            match_artists("zera kurtseitova", "kurtseitova zera"),
            Some(ArtistMatch::TokenOverlap {
                overlap: 2,
                min_size: 2
            })
        );
    }

    #[test]
    fn test_short_tokens_are_ignored() {
        assert!(!artists_match("a b c", "a b d"));
        assert!(!artists_match("dj mc", "mc dj x"));
    }

    #[test]
    fn test_below_half_overlap() {
        assert!(!artists_match("enver izmaylov ensemble", "enver osmanov ablayev"));
    }

    #[test]
    fn test_no_overlap() {
        assert!(!artists_match("servet ablayev", "zera kurtseitova"));
    }

    #[test]
    fn test_symmetric() {
        for a in ARTISTS {
            for b in ARTISTS {
                assert_eq!(
                    match_artists(a, b),
                    match_artists(b, a),
                    "asymmetric for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ArtistMatch::TokenOverlap {
                overlap: 1,
                min_size: 2
            }
            .to_string(),
            "token overlap 1/2"
        );
    }
}
