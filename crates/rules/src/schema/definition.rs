//! Rule definition document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::MatchMode;

/// Delimiter used to join several replies into one message.
pub const DEFAULT_REPLY_DELIMITER: &str = ". ";

/// Top-level rule definition file.
///
/// Unknown keys are ignored so service-level settings can live in the same
/// file without breaking the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Definition {
    /// Ordered rule list. Declaration order is the tie-break key for hits.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    /// Regex whose matches are deleted from incoming text before matching.
    #[serde(default)]
    pub clean_filter: String,
    /// Collapse repeated letters and drop repeated words.
    #[serde(default, rename = "remove_duplicate_letters")]
    pub remove_duplicates: bool,
    #[serde(default)]
    pub bot_mode: MatchMode,
    #[serde(default = "default_reply_delimiter")]
    pub reply_delimiter: String,
    /// Secret file path. Relative paths resolve against the definition file.
    #[serde(default)]
    pub secrets: Option<PathBuf>,
}

impl Definition {
    /// The referenced secret path, ignoring an empty value.
    pub fn secrets_path(&self) -> Option<&Path> {
        self.secrets
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            clean_filter: String::new(),
            remove_duplicates: false,
            bot_mode: MatchMode::default(),
            reply_delimiter: default_reply_delimiter(),
            secrets: None,
        }
    }
}

fn default_reply_delimiter() -> String {
    DEFAULT_REPLY_DELIMITER.to_string()
}

/// One rule as written in the definition file, before compilation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSpec {
    /// Human-readable description, used as the rule label.
    #[serde(default)]
    pub text: String,
    pub pattern: String,
    pub response: String,
}

impl RuleSpec {
    /// Label reported for hits; falls back to the pattern when `text` is blank.
    pub fn label(&self) -> &str {
        if self.text.trim().is_empty() {
            &self.pattern
        } else {
            &self.text
        }
    }
}
