//! Definition sources: where reconciliation gets its raw bytes from.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::schema::SecretsRef;

use super::error::{Result, RuleError};

/// Raw bytes of one definition read, plus the secret bytes it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBytes {
    pub definition: Vec<u8>,
    pub secret: Option<Vec<u8>>,
}

/// Supplies definition bytes on demand.
pub trait DefinitionSource: Send + Sync {
    /// Read the current definition.
    ///
    /// `Ok(None)` means the definition does not exist right now, which callers
    /// treat as "no change".
    fn fetch(&self) -> Result<Option<SourceBytes>>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Reads a YAML definition file and the secret file it references.
///
/// Relative `secrets` paths resolve against the definition file's directory.
/// Both files are read fully and closed before `fetch` returns.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve(&self, referenced: &Path) -> PathBuf {
        if referenced.is_absolute() {
            return referenced.to_path_buf();
        }
        match self.path.parent() {
            Some(dir) => dir.join(referenced),
            None => referenced.to_path_buf(),
        }
    }
}

impl DefinitionSource for FileSource {
    fn fetch(&self) -> Result<Option<SourceBytes>> {
        let definition = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RuleError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let secret = match SecretsRef::from_definition_bytes(&definition) {
            Some(referenced) => {
                let path = self.resolve(&referenced);
                match fs::read(&path) {
                    Ok(bytes) => Some(bytes),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        return Err(RuleError::MissingSecrets { path })
                    }
                    Err(source) => return Err(RuleError::Io { path, source }),
                }
            }
            None => None,
        };

        Ok(Some(SourceBytes { definition, secret }))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory source, handy for embedding rules and for tests.
#[derive(Debug, Default)]
pub struct StaticSource {
    bytes: std::sync::RwLock<Option<SourceBytes>>,
}

impl StaticSource {
    pub fn new(definition: impl Into<Vec<u8>>) -> Self {
        let source = Self::default();
        source.set(definition, None);
        source
    }

    /// Replace the served bytes.
    pub fn set(&self, definition: impl Into<Vec<u8>>, secret: Option<Vec<u8>>) {
        *self.bytes.write().expect("static source lock poisoned") = Some(SourceBytes {
            definition: definition.into(),
            secret,
        });
    }

    /// Make the source report an absent definition.
    pub fn clear(&self) {
        *self.bytes.write().expect("static source lock poisoned") = None;
    }
}

impl DefinitionSource for StaticSource {
    fn fetch(&self) -> Result<Option<SourceBytes>> {
        Ok(self.bytes.read().expect("static source lock poisoned").clone())
    }

    fn describe(&self) -> String {
        "<in-memory>".to_string()
    }
}
