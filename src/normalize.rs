//! Title normalization for fuzzy matching.
//!
//! Poster files and archives are named loosely: they carry release years,
//! "set by <creator>" credits, and arbitrary punctuation that media folders
//! do not. `normalize` reduces a title to a canonical lowercase form so that
//! similarity scoring compares the actual names instead of the decoration.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

/// Matches a trailing release year in parentheses, e.g. " (1999)".
static RE_TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d{4}\)\s*$").expect("Invalid year regex"));

/// Matches a trailing "set by <creator>" credit and its leading punctuation.
/// Requires a separator before "set" so that words like "Sunset" are left alone.
static RE_SET_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\s,;:_\-]+set by\b.*$").expect("Invalid set by regex"));

/// A single normalization step.
///
/// Rules are applied in the order they are listed in [`RULES`].
/// Keeping them as a flat list makes each step testable on its own and
/// lets new rules slot in without touching the matching code.
pub struct Rule {
    pub name: &'static str,
    apply: fn(&str) -> String,
}

impl Rule {
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        (self.apply)(input)
    }
}

/// The normalization pipeline, in application order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "strip_trailing_year",
        apply: strip_trailing_year,
    },
    Rule {
        name: "strip_set_by_credit",
        apply: strip_set_by_credit,
    },
    Rule {
        name: "punctuation_to_spaces",
        apply: punctuation_to_spaces,
    },
    Rule {
        name: "lowercase",
        apply: lowercase,
    },
    Rule {
        name: "collapse_whitespace",
        apply: collapse_whitespace,
    },
];

/// Normalize a title for comparison.
///
/// Pure and deterministic: identical input always produces identical output,
/// and normalizing an already-normalized string is a no-op.
///
/// ```rust
/// use poster_tools::normalize::normalize;
///
/// assert_eq!(normalize("The Matrix (1999)"), "the matrix");
/// assert_eq!(normalize("Movie: The Sequel"), "movie the sequel");
/// assert_eq!(normalize("Foo set by UserXYZ"), "foo");
/// ```
#[must_use]
pub fn normalize(title: &str) -> String {
    RULES.iter().fold(title.to_string(), |value, rule| rule.apply(&value))
}

fn strip_trailing_year(input: &str) -> String {
    RE_TRAILING_YEAR.replace(input, "").into_owned()
}

fn strip_set_by_credit(input: &str) -> String {
    RE_SET_BY.replace(input, "").into_owned()
}

fn punctuation_to_spaces(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect()
}

fn lowercase(input: &str) -> String {
    input.to_lowercase()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().join(" ")
}
