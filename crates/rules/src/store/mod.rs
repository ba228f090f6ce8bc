//! Hot-reloadable rule store.
//!
//! Holds the active definition snapshot (compiled rules, engine settings and
//! the SHA-256 digests of the bytes they came from). Reconciliation compares
//! digests first and only parses and compiles when something changed; the new
//! snapshot is published with a single atomic pointer swap, or not at all.

mod core;
mod error;
mod snapshot;
mod source;


pub use self::core::RuleStore;
pub use self::error::{Result, RuleError};
pub use self::snapshot::{content_digest, Snapshot};
pub use self::source::{DefinitionSource, FileSource, SourceBytes, StaticSource};
