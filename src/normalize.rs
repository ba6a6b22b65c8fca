//! Canonical text form used for every artist/title comparison.
//!
//! `normalize(x) = collapse_whitespace(strip_non_letter_digit(lowercase(transliterate(x))))`
//!
//! The normalized form is only ever compared, never displayed. It must stay
//! idempotent: library keys and incoming keys are produced by the same
//! function, and `normalize(normalize(x)) == normalize(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::transliterate::Transliterate;

/// Anything that is not a Unicode letter, number, or whitespace.
pub static NON_LETTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());

/// Any run of whitespace.
pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replace punctuation and symbols with a space so "Ablayev/Ant" does not
/// fuse into a single word.
pub fn strip_non_letter_digit(s: &str) -> String {
    NON_LETTER_DIGIT.replace_all(s, " ").into_owned()
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

/// Normalizer bound to one injected transliterator.
pub struct TextNormalizer {
    transliterator: Box<dyn Transliterate>,
}

impl TextNormalizer {
    pub fn new<T>(transliterator: T) -> Self
    where
        T: Transliterate + 'static,
    {
        Self::from_boxed(Box::new(transliterator))
    }

    pub fn from_boxed(transliterator: Box<dyn Transliterate>) -> Self {
        Self { transliterator }
    }

    /// Total and pure: empty input yields an empty string, nothing panics.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let transliterated = self.transliterator.transliterate(text);
        collapse_whitespace(&strip_non_letter_digit(&transliterated.to_lowercase()))
    }
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer").finish_non_exhaustive()
    }
}
