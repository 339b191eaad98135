//! Loyalty onboarding rule configuration and derivation engine.
//!
//! This crate provides:
//! - Entity attribute catalog with KPI counters derived from it
//! - Value program model (value type, tiers, earning rules)
//! - Signal queues with a step-by-step signal template builder
//! - YAML documents with a filesystem-backed store
//! - Finalize-time validation with path-addressed findings
//! - A single-writer session store with a change history

pub mod attributes;
pub mod documents;
pub mod earning;
pub mod history;
pub mod kpi;
pub mod program;
pub mod queue;
pub mod schema;
pub mod signal;
pub mod store;
pub mod tier;
pub mod validation;

pub use attributes::{AttributeCatalog, AttributeEntry, KpiWeight};
pub use documents::{DocumentStore, LoadResult, LoadStatus, StoreError};
pub use kpi::{derive_kpis, KpiBase, KpiCounters};
pub use program::{ValueConfig, ValueProgram, ValueType};
pub use queue::{Queue, QueueSet};
pub use schema::{CommonMetadata, DocumentKind, RuleDocument};
pub use signal::{SignalBuilder, SignalTemplate};
pub use store::{OnboardingState, OnboardingStore};
pub use validation::ValidationResult;
