//! Pattern-based auto-responder engine.
//!
//! This crate provides:
//! - YAML rule definitions with serde deserialization
//! - Text normalization (filtering, case folding, duplicate collapsing)
//! - Rule matching with boundary-only or everywhere modes and positional ordering
//! - A hot-reloadable rule store with SHA-256 change detection and atomic swaps
//! - A periodic reload controller and the message-to-replies responder

pub mod matcher;
pub mod normalize;
pub mod reload;
pub mod responder;
pub mod rule;
pub mod schema;
pub mod store;

pub use matcher::{match_rules, Hit};
pub use normalize::Normalizer;
pub use reload::{ReloadController, ReloadOutcome};
pub use responder::Responder;
pub use rule::{CompileError, Rule, RuleSet};
pub use schema::MatchMode;
pub use store::{RuleError, RuleStore, Snapshot};
