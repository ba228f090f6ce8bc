//! Rule matching over normalized text.
//!
//! Two modes:
//! - **All**: every non-overlapping match of every rule is a hit.
//! - **FirstLast** (boundary mode): the pattern runs over the whole text and a
//!   match span is kept only if it starts at offset 0 or if nothing but
//!   whitespace follows it. A span touching both ends yields one hit.
//!
//! Boundary mode deliberately anchors on match spans of the full text rather
//! than testing the first and last words separately, so multi-word patterns
//! such as `^good morning` still count as boundary hits.
//!
//! Hits come back sorted by `(position, rule_index)`; replies are joined in
//! that order.

use tracing::trace;

use crate::rule::RuleSet;
use crate::schema::MatchMode;

/// One matched occurrence of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit<'a> {
    /// Byte offset of the match start in the normalized text.
    pub position: usize,
    /// Declaration index of the rule.
    pub rule_index: usize,
    pub response: &'a str,
    pub rule_label: &'a str,
}

/// Match `text` against every rule in `rules`.
///
/// Never fails: an empty rule set or text simply yields no hits.
pub fn match_rules<'a>(text: &str, rules: &'a RuleSet, mode: &MatchMode) -> Vec<Hit<'a>> {
    if let MatchMode::Unrecognized(name) = mode {
        trace!(mode = %name, "unrecognized match mode, matching everywhere");
    }
    let boundary_only = mode.is_boundary_only();

    let mut hits = Vec::new();
    for (rule_index, rule) in rules.iter().enumerate() {
        let before = hits.len();
        for m in rule.pattern().find_iter(text) {
            if boundary_only && !touches_boundary(text, m.start(), m.end()) {
                continue;
            }
            hits.push(Hit {
                position: m.start(),
                rule_index,
                response: rule.response(),
                rule_label: rule.label(),
            });
        }
        trace!(
            rule = %rule.label(),
            pattern = %rule.pattern_source(),
            hits = hits.len() - before,
            "pattern evaluated"
        );
    }

    hits.sort_by_key(|h| (h.position, h.rule_index));
    hits
}

/// Whether the span `[start, end)` sits at the start or the end of `text`.
fn touches_boundary(text: &str, start: usize, end: usize) -> bool {
    start == 0 || text[end..].trim().is_empty()
}
