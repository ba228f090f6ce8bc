//! Match mode enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How rule patterns are applied to a message.
///
/// Anything other than `first_last` or `all` is kept verbatim as
/// [`MatchMode::Unrecognized`] and evaluated like [`MatchMode::All`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum MatchMode {
    /// Only matches touching the start or the end of the message count.
    #[default]
    FirstLast,
    /// Every non-overlapping match counts.
    All,
    /// Unknown mode name; falls back to `All`.
    Unrecognized(String),
}

impl MatchMode {
    /// Whether hits are restricted to the message boundaries.
    pub fn is_boundary_only(&self) -> bool {
        matches!(self, MatchMode::FirstLast)
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::FirstLast => write!(f, "first_last"),
            MatchMode::All => write!(f, "all"),
            MatchMode::Unrecognized(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for MatchMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            // An empty value means "not set", same as a missing key.
            "" | "first_last" => MatchMode::FirstLast,
            "all" => MatchMode::All,
            _ => MatchMode::Unrecognized(s.trim().to_string()),
        })
    }
}

impl From<String> for MatchMode {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

// `bot_mode:` with no value arrives as null.
impl From<Option<String>> for MatchMode {
    fn from(s: Option<String>) -> Self {
        s.map(MatchMode::from).unwrap_or_default()
    }
}

impl From<MatchMode> for String {
    fn from(mode: MatchMode) -> Self {
        mode.to_string()
    }
}
