//! Secret-bearing document and the lightweight reference lookup.

use std::path::PathBuf;

use serde::Deserialize;

/// Contents of the secrets file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsDocument {
    #[serde(default)]
    pub telegram: TelegramSecrets,
}

#[derive(Clone, Default, Deserialize)]
pub struct TelegramSecrets {
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for TelegramSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSecrets")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// First-pass view of a definition that only reads the `secrets` key.
///
/// Lets a definition source find the secret file without compiling rules.
#[derive(Debug, Default, Deserialize)]
pub struct SecretsRef {
    #[serde(default)]
    pub secrets: Option<PathBuf>,
}

impl SecretsRef {
    /// Extract the referenced secret path from raw definition bytes.
    ///
    /// Returns `None` for unparseable input; the full parse reports the error.
    pub fn from_definition_bytes(bytes: &[u8]) -> Option<PathBuf> {
        serde_yaml::from_slice::<SecretsRef>(bytes)
            .ok()?
            .secrets
            .filter(|p| !p.as_os_str().is_empty())
    }
}
