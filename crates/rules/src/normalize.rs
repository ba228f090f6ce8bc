//! Text normalization applied to every message before rule matching.
//!
//! Steps, in order:
//! 1. Delete every match of the clean filter (the filter names what to drop).
//! 2. Unicode-aware lowercasing.
//! 3. Optionally collapse repeated letters inside each word (decimal digits
//!    are never collapsed) and drop words already seen earlier in the
//!    message. Collapsing runs first, so "hello hello" becomes "helo".
//! 4. Collapse whitespace runs to one space and trim.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

// Unicode decimal digits (Nd) only; superscripts and numerals collapse.
static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("decimal digit pattern is valid"));

/// A compiled clean filter plus the duplicate-collapsing flag.
///
/// Built once per definition snapshot so the filter is never recompiled on
/// the message path.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    filter: Option<Regex>,
    collapse_duplicates: bool,
}

impl Normalizer {
    /// Compile `filter`. An empty filter deletes nothing.
    pub fn new(filter: &str, collapse_duplicates: bool) -> Result<Self, regex::Error> {
        let filter = if filter.is_empty() {
            None
        } else {
            Some(Regex::new(filter)?)
        };
        Ok(Self {
            filter,
            collapse_duplicates,
        })
    }

    /// Source of the clean filter, if any.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_ref().map(Regex::as_str)
    }

    pub fn normalize(&self, input: &str) -> String {
        normalize(input, self.filter.as_ref(), self.collapse_duplicates)
    }
}

/// Normalize `input` for matching. An empty result means "nothing to match".
pub fn normalize(input: &str, filter: Option<&Regex>, collapse_duplicates: bool) -> String {
    let stripped = match filter {
        Some(re) => re.replace_all(input, ""),
        None => Cow::Borrowed(input),
    };
    let lowered = stripped.to_lowercase();

    if !collapse_duplicates {
        return lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    }

    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for word in lowered.split_whitespace().map(collapse_repeats) {
        if seen.insert(word.clone()) {
            words.push(word);
        }
    }
    words.join(" ")
}

fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit() || DECIMAL_DIGIT.is_match(ch.encode_utf8(&mut [0u8; 4]))
}

/// Collapse runs of the same character to one, leaving digit runs intact.
fn collapse_repeats(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev = None;
    for ch in word.chars() {
        if is_decimal_digit(ch) || prev != Some(ch) {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}
