//! YAML definition schema with serde deserialization.
//!
//! Defines the document types read from disk:
//! - `Definition`: engine settings plus the ordered rule list
//! - `RuleSpec`: one uncompiled rule (label, pattern, response)
//! - `MatchMode`: boundary-only or everywhere matching
//! - `SecretsDocument`: the separate secret-bearing file

mod definition;
mod mode;
mod secrets;

pub use definition::*;
pub use mode::*;
pub use secrets::*;

#[cfg(test)]
mod tests;
