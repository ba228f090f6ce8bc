//! Compiled rules.
//!
//! A [`Rule`] can only be obtained by compiling a [`RuleSpec`], so every rule
//! in a [`RuleSet`] carries a valid pattern. Rule sets are never mutated once
//! built; a reload compiles a fresh one.

use std::sync::Arc;

use regex::Regex;

use crate::schema::RuleSpec;

/// A rule whose pattern failed to compile.
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern {pattern:?} in rule '{label}': {source}")]
pub struct CompileError {
    pub label: String,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A compiled pattern/response pair.
#[derive(Debug, Clone)]
pub struct Rule {
    label: String,
    pattern: Regex,
    response: String,
}

impl Rule {
    /// Compile a rule from its definition.
    pub fn compile(spec: &RuleSpec) -> Result<Self, CompileError> {
        let pattern = Regex::new(&spec.pattern).map_err(|source| CompileError {
            label: spec.label().to_string(),
            pattern: spec.pattern.clone(),
            source,
        })?;
        Ok(Self {
            label: spec.label().to_string(),
            pattern,
            response: spec.response.clone(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The pattern as written in the definition.
    pub fn pattern_source(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Ordered, immutable collection of compiled rules.
///
/// The position of a rule is its declaration index and breaks ties between
/// hits at the same offset. Clones share the underlying rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Arc::from(Vec::new()),
        }
    }
}

impl RuleSet {
    /// Compile every spec, in order. The first failure aborts the whole set.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, CompileError> {
        let rules = specs
            .iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules: rules.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(text: &str, pattern: &str, response: &str) -> RuleSpec {
        RuleSpec {
            text: text.to_string(),
            pattern: pattern.to_string(),
            response: response.to_string(),
        }
    }

    #[test]
    fn compile_keeps_declaration_order() {
        let set = RuleSet::compile(&[
            spec("first", "a", "1"),
            spec("second", "b", "2"),
            spec("third", "c", "3"),
        ])
        .unwrap();

        let labels: Vec<_> = set.iter().map(Rule::label).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
        assert_eq!(set.get(1).unwrap().response(), "2");
    }

    #[test]
    fn compile_error_names_rule_and_pattern() {
        let err = RuleSet::compile(&[
            spec("fine", "ok", "1"),
            spec("broken", "(unclosed", "2"),
            spec("also fine", "yes", "3"),
        ])
        .unwrap_err();

        assert_eq!(err.label, "broken");
        assert_eq!(err.pattern, "(unclosed");
        let msg = err.to_string();
        assert!(msg.contains("broken"), "message was: {}", msg);
        assert!(msg.contains("(unclosed"), "message was: {}", msg);
    }

    #[test]
    fn unlabeled_rule_uses_pattern_as_label() {
        let rule = Rule::compile(&spec("", "^yo", "hey")).unwrap();
        assert_eq!(rule.label(), "^yo");
        assert_eq!(rule.pattern_source(), "^yo");
    }

    #[test]
    fn clones_share_rules() {
        let set = RuleSet::compile(&[spec("a", "a", "1")]).unwrap();
        let copy = set.clone();
        assert!(std::ptr::eq(set.get(0).unwrap(), copy.get(0).unwrap()));
    }

    #[test]
    fn empty_set() {
        let set = RuleSet::compile(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
