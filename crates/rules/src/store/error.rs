//! Error types for rule store reconciliation.

use std::path::PathBuf;

use crate::rule::CompileError;

/// Errors that can occur while reconciling a definition into a snapshot.
///
/// None of them are fatal to a running service: the previous snapshot stays
/// active whenever one is returned.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Reading a present definition or secret source failed.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse/deserialization error in the definition.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A rule pattern failed to compile; the whole batch is rejected.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The clean filter failed to compile.
    #[error("invalid clean_filter {pattern:?}: {source}")]
    Filter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The definition references a secret source that is not available.
    #[error("definition references secrets at {} but none were supplied", .path.display())]
    MissingSecrets { path: PathBuf },

    /// The secret document is malformed.
    #[error("secrets parse error: {0}")]
    SecretsParse(#[source] serde_yaml::Error),
}

/// Result alias for rule store operations.
pub type Result<T> = std::result::Result<T, RuleError>;
