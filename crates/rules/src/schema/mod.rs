//! YAML document schema for onboarding configuration.
//!
//! - `RuleEnvelope`: first-pass header (apiVersion, kind, metadata)
//! - `RuleDocument`: enum dispatching to the kind-specific document
//! - `Document<S>`: the header plus a kind-specific `spec` body

mod document;
mod envelope;
mod kind;
mod metadata;

pub use document::*;
pub use envelope::*;
pub use kind::*;
pub use metadata::*;

/// The only document version currently understood.
pub const API_VERSION: &str = "v1";

#[cfg(test)]
mod tests;
