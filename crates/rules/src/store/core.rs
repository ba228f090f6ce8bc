//! Core [`RuleStore`] struct: atomic snapshot publication with digest-based
//! change detection.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{debug, info};

use super::error::Result;
use super::snapshot::{content_digest, Snapshot};
use super::source::DefinitionSource;

/// Holds the active [`Snapshot`] and swaps it when the source changes.
///
/// Readers call [`snapshot`](RuleStore::snapshot) and get an `Arc` to a
/// complete generation; they never block and never see a half-built one.
/// Reconciliations are serialized by a writer lock that the read path does
/// not touch. Parsing and compiling happen before the swap, so a failure
/// leaves the active snapshot exactly as it was.
pub struct RuleStore {
    current: ArcSwap<Snapshot>,
    writer: Mutex<()>,
}

impl RuleStore {
    /// A store with no rules. The first reconcile always publishes.
    pub fn empty() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::empty()),
            writer: Mutex::new(()),
        }
    }

    /// Build a store from initial source bytes. Fails if they do not compile.
    pub fn load(definition: &[u8], secret: Option<&[u8]>) -> Result<Self> {
        let store = Self::empty();
        store.reconcile(definition, secret)?;
        Ok(store)
    }

    /// The currently active snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Compare source bytes against the active snapshot and replace it if
    /// either digest changed.
    ///
    /// Returns `Ok(false)` without parsing when both digests are unchanged.
    /// On any parse or compile error the active snapshot is left untouched.
    pub fn reconcile(&self, definition: &[u8], secret: Option<&[u8]>) -> Result<bool> {
        let _writer = self.writer.lock().expect("rule store writer lock poisoned");

        let content_hash = content_digest(definition);
        let secret_hash = secret.map(content_digest);

        let current = self.current.load_full();
        if current.content_hash() == content_hash && current.secret_hash() == secret_hash.as_deref() {
            debug!(generation = current.generation(), "rule definition unchanged");
            return Ok(false);
        }

        let definition_changed = current.content_hash() != content_hash;
        let next = Snapshot::build(
            definition,
            secret,
            content_hash,
            secret_hash,
            current.generation() + 1,
        )?;

        info!(
            generation = next.generation(),
            rules = next.rules().len(),
            mode = %next.mode(),
            definition_changed,
            "publishing rule snapshot"
        );
        self.current.store(Arc::new(next));
        Ok(true)
    }

    /// Fetch bytes from `source` and reconcile them.
    ///
    /// An absent definition is not an error: the active snapshot keeps
    /// serving and `Ok(false)` is returned.
    pub fn reconcile_from(&self, source: &dyn DefinitionSource) -> Result<bool> {
        match source.fetch()? {
            Some(bytes) => self.reconcile(&bytes.definition, bytes.secret.as_deref()),
            None => {
                debug!(source = %source.describe(), "rule definition absent, keeping current snapshot");
                Ok(false)
            }
        }
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::empty()
    }
}
