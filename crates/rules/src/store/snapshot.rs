//! One immutable generation of loaded configuration.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::normalize::Normalizer;
use crate::rule::RuleSet;
use crate::schema::{Definition, MatchMode, SecretsDocument};

use super::error::{Result, RuleError};

/// Compiled rules and engine settings built from one set of source bytes.
///
/// `content_hash` is the SHA-256 hex digest of the exact definition bytes this
/// snapshot was parsed from; `secret_hash` is the digest of the secret bytes,
/// if any were supplied.
pub struct Snapshot {
    rules: RuleSet,
    mode: MatchMode,
    normalizer: Normalizer,
    reply_delimiter: String,
    token: Option<String>,
    content_hash: String,
    secret_hash: Option<String>,
    generation: u64,
}

impl Snapshot {
    /// The empty generation a store starts from. Its hashes match no input.
    pub(super) fn empty() -> Self {
        Self {
            rules: RuleSet::default(),
            mode: MatchMode::default(),
            normalizer: Normalizer::default(),
            reply_delimiter: Definition::default().reply_delimiter,
            token: None,
            content_hash: String::new(),
            secret_hash: None,
            generation: 0,
        }
    }

    /// Parse and compile a candidate snapshot. Nothing is published here.
    pub(super) fn build(
        definition_bytes: &[u8],
        secret_bytes: Option<&[u8]>,
        content_hash: String,
        secret_hash: Option<String>,
        generation: u64,
    ) -> Result<Self> {
        let definition: Definition = serde_yaml::from_slice(definition_bytes)?;

        let rules = RuleSet::compile(&definition.rules)?;
        let normalizer = Normalizer::new(&definition.clean_filter, definition.remove_duplicates)
            .map_err(|source| RuleError::Filter {
                pattern: definition.clean_filter.clone(),
                source,
            })?;

        let token = match (secret_bytes, definition.secrets_path()) {
            (Some(bytes), _) => {
                let secrets: SecretsDocument =
                    serde_yaml::from_slice(bytes).map_err(RuleError::SecretsParse)?;
                Some(secrets.telegram.token).filter(|t| !t.is_empty())
            }
            (None, Some(path)) => {
                return Err(RuleError::MissingSecrets {
                    path: path.to_path_buf(),
                })
            }
            (None, None) => None,
        };

        Ok(Self {
            rules,
            mode: definition.bot_mode,
            normalizer,
            reply_delimiter: definition.reply_delimiter,
            token,
            content_hash,
            secret_hash,
            generation,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn mode(&self) -> &MatchMode {
        &self.mode
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn reply_delimiter(&self) -> &str {
        &self.reply_delimiter
    }

    /// Transport token merged from the secret source.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn secret_hash(&self) -> Option<&str> {
        self.secret_hash.as_deref()
    }

    /// Number of successful reconciliations that produced this snapshot.
    /// Zero for the empty startup snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("generation", &self.generation)
            .field("rules", &self.rules.len())
            .field("mode", &self.mode)
            .field("normalizer", &self.normalizer)
            .field("reply_delimiter", &self.reply_delimiter)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("content_hash", &self.content_hash)
            .field("secret_hash", &self.secret_hash)
            .finish()
    }
}

/// SHA-256 hex digest of raw source bytes.
pub fn content_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
