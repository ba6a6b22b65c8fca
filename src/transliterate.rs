//! Script transliteration for cross-script matching.
//!
//! Library and incoming filenames may spell the same artist in Cyrillic or in
//! a Latin transliteration. Everything is folded to a Latin approximation
//! before comparison, either through an ordered rule table (the default) or
//! through generic `any_ascii` folding.
//!
//! CRITICAL: rule order is significant. Later rules see the output of earlier
//! ones (context rules for `е` must run before the single-letter rules that
//! remove the context), so tables are applied as a strict left fold.

use any_ascii::any_ascii;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{DedupError, Result};

/// Bundled Crimean Tatar Cyrillic → Latin table.
pub const BUILTIN_RULES: &str = include_str!("../rules/crh-cyr2lat.json");

/// Name reported for the bundled table in errors and logs.
pub const BUILTIN_RULES_NAME: &str = "<builtin crh-cyr2lat>";

/// A pure `text -> text` transliteration step.
///
/// Implemented by [`RuleTable`], [`AnyAscii`], and any `Fn(&str) -> String`
/// closure, so tests can inject a tiny fake table.
pub trait Transliterate {
    fn transliterate(&self, text: &str) -> String;
}

impl<F> Transliterate for F
where
    F: Fn(&str) -> String,
{
    fn transliterate(&self, text: &str) -> String {
        self(text)
    }
}

// ============================================================================
// Rule Table
// ============================================================================

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
struct RuleSpec {
    pattern: String,
    replacement: String,
    #[serde(default)]
    first_only: bool,
}

/// One compiled (pattern, replacement) pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    replacement: String,
    first_only: bool,
}

impl Rule {
    fn apply(&self, text: &str) -> String {
        if self.first_only {
            self.pattern.replace(text, self.replacement.as_str()).into_owned()
        } else {
            self.pattern
                .replace_all(text, self.replacement.as_str())
                .into_owned()
        }
    }
}

/// Ordered transliteration rules loaded from a versioned JSON table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    name: String,
    version: String,
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Parse and compile a JSON rule table.
    ///
    /// `source_name` only labels errors (a file path or the builtin name).
    pub fn from_json(source_name: &str, json: &str) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(json.trim_start_matches('\u{FEFF}'))
            .map_err(|e| DedupError::rule_load(source_name, format!("invalid JSON: {e}")))?;

        let pairs = file
            .rules
            .into_iter()
            .map(|spec| (spec.pattern, spec.replacement, spec.first_only));
        let rules = compile(source_name, pairs)?;

        Ok(Self {
            name: file.name.unwrap_or_else(|| source_name.to_string()),
            version: file.version.unwrap_or_else(|| "unversioned".to_string()),
            rules,
        })
    }

    /// Load a rule table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let json = fs::read_to_string(path)
            .map_err(|e| DedupError::rule_load(&source_name, format!("cannot read: {e}")))?;
        Self::from_json(&source_name, &json)
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_RULES_NAME, BUILTIN_RULES)
    }

    /// Build a table from in-memory (pattern, replacement) pairs, all global.
    pub fn from_pairs<I, P, R>(source_name: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(p, r)| (p.into(), r.into(), false));
        Ok(Self {
            name: source_name.to_string(),
            version: "unversioned".to_string(),
            rules: compile(source_name, pairs)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile<I>(source_name: &str, specs: I) -> Result<Vec<Rule>>
where
    I: IntoIterator<Item = (String, String, bool)>,
{
    let mut rules = Vec::new();
    for (i, (pattern, replacement, first_only)) in specs.into_iter().enumerate() {
        let pattern = Regex::new(&pattern)
            .map_err(|e| DedupError::rule_load(source_name, format!("rule {i}: {e}")))?;
        rules.push(Rule {
            pattern,
            replacement,
            first_only,
        });
    }
    if rules.is_empty() {
        return Err(DedupError::rule_load(source_name, "table contains no rules"));
    }
    Ok(rules)
}

impl Transliterate for RuleTable {
    /// Pad with one space on each side so boundary rules (`" е"`) also fire
    /// at the string edges, fold the rules in order, then drop the padding.
    fn transliterate(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let padded = format!(" {text} ");
        let folded = self
            .rules
            .iter()
            .fold(padded, |acc, rule| rule.apply(&acc));

        // A rule may have consumed a padding space; only strip what is left.
        let unpadded = folded.strip_prefix(' ').unwrap_or(&folded);
        unpadded.strip_suffix(' ').unwrap_or(unpadded).to_string()
    }
}

// ============================================================================
// Generic folding
// ============================================================================

/// Generic Unicode → ASCII transliteration, for libraries in scripts the
/// rule table does not cover.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyAscii;

impl Transliterate for AnyAscii {
    fn transliterate(&self, text: &str) -> String {
        any_ascii(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.name(), "crh-cyr2lat");
        assert!(!table.is_empty());
    }

    #[test]
    fn test_builtin_crimean_tatar() {
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.transliterate("Сервет Аблаев"), "Servet Ablayev");
        assert_eq!(table.transliterate("Ант"), "Ant");
        assert_eq!(table.transliterate("Къырым"), "Qırım");
        assert_eq!(table.transliterate("Джемиле"), "Cemile");
        assert_eq!(table.transliterate("Эльвира"), "Elvira");
        assert_eq!(table.transliterate("Шевкет"), "Şevket");
    }

    #[test]
    fn test_padding_enables_edge_rules() {
        // Word-initial е becomes ye; the padding makes the string start a boundary.
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.transliterate("Ермак"), "Yermak");
        assert_eq!(table.transliterate("ел"), "yel");
    }

    #[test]
    fn test_padding_is_removed() {
        let table = RuleTable::from_pairs("fake", [("x", "y")]).unwrap();
        assert_eq!(table.transliterate("x"), "y");
        assert_eq!(table.transliterate(" x "), " y ");
    }

    #[test]
    fn test_boundary_rule_with_padding() {
        let table = RuleTable::from_pairs("fake", [(r" ab", " X")]).unwrap();
        assert_eq!(table.transliterate("ab ab"), "X X");
    }

    #[test]
    fn test_rule_order_is_preserved() {
        let digraph_first =
            RuleTable::from_pairs("fake", [("дж", "c"), ("д", "d"), ("ж", "j"), ("а", "a"), ("н", "n")])
                .unwrap();
        assert_eq!(digraph_first.transliterate("джан"), "can");

        let singles_first =
            RuleTable::from_pairs("fake", [("д", "d"), ("ж", "j"), ("дж", "c"), ("а", "a"), ("н", "n")])
                .unwrap();
        assert_eq!(singles_first.transliterate("джан"), "djan");
    }

    #[test]
    fn test_empty_input() {
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.transliterate(""), "");
    }

    #[test]
    fn test_first_only_rule() {
        let json = r#"{"rules": [{"pattern": "a", "replacement": "b", "first_only": true}]}"#;
        let table = RuleTable::from_json("inline", json).unwrap();
        assert_eq!(table.transliterate("aaa"), "baa");
        assert_eq!(table.version(), "unversioned");
    }

    #[test]
    fn test_malformed_tables_are_rule_load_errors() {
        let err = RuleTable::from_json("broken.json", "{not json").unwrap_err();
        assert!(matches!(err, DedupError::RuleLoad { .. }));

        let err = RuleTable::from_json("empty.json", r#"{"rules": []}"#).unwrap_err();
        assert!(err.to_string().contains("no rules"));

        let err =
            RuleTable::from_json("bad.json", r#"{"rules": [{"pattern": "(", "replacement": ""}]}"#)
                .unwrap_err();
        assert!(err.to_string().contains("rule 0"));
    }

    #[test]
    fn test_missing_rule_file() {
        let err = RuleTable::load(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(matches!(err, DedupError::RuleLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }

    #[test]
    fn test_closure_transliterator() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.transliterate("abc"), "ABC");
    }

    #[test]
    fn test_any_ascii() {
        assert_eq!(AnyAscii.transliterate("Björk"), "Bjork");
        assert_eq!(AnyAscii.transliterate("кино"), "kino");
    }
}
