//! Single-writer onboarding session state.
//!
//! [`OnboardingStore`] owns the attribute catalog, value program and signal
//! queues. Every mutation runs against a copy of the state and is committed
//! only when it succeeds, so a rejected change never leaves partial state.
//! KPI counters are recomputed after each committed change.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use loyalty_core::{Config, LoyaltyError, ObjectKind, QueueId, Result, SignalId, TierId};

use crate::attributes::AttributeCatalog;
use crate::earning::EarningRulesPatch;
use crate::history::{ChangeAction, ChangeLog, ChangeOutcome};
use crate::kpi::{derive_kpis, KpiBase, KpiCounters};
use crate::program::{ValueConfigPatch, ValueProgram, ValueType};
use crate::queue::{Queue, QueuePatch, QueueSet};
use crate::schema::{CommonMetadata, DocumentKind, RuleDocument};
use crate::signal::{SignalBuilder, SignalPatch, SignalTemplate};
use crate::tier::{NewTier, Tier, TierPatch};
use crate::validation::{self, ValidationResult};

/// Snapshot of everything configured during onboarding.
///
/// `kpis` is serialized for display but never read back; loading a state
/// derives it from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateRecord")]
pub struct OnboardingState {
    attributes: AttributeCatalog,
    kpi_base: KpiBase,
    kpis: KpiCounters,
    program: ValueProgram,
    queues: QueueSet,
}

impl OnboardingState {
    pub fn new(
        attributes: AttributeCatalog,
        kpi_base: KpiBase,
        program: ValueProgram,
        queues: QueueSet,
    ) -> Self {
        let kpis = derive_kpis(&attributes, &kpi_base);
        Self {
            attributes,
            kpi_base,
            kpis,
            program,
            queues,
        }
    }

    pub fn attributes(&self) -> &AttributeCatalog {
        &self.attributes
    }

    pub fn kpi_base(&self) -> KpiBase {
        self.kpi_base
    }

    pub fn kpis(&self) -> KpiCounters {
        self.kpis
    }

    pub fn program(&self) -> &ValueProgram {
        &self.program
    }

    pub fn queues(&self) -> &QueueSet {
        &self.queues
    }

    fn recompute_kpis(&mut self) {
        self.kpis = derive_kpis(&self.attributes, &self.kpi_base);
    }
}

/// Serialized form of [`OnboardingState`] without the derived counters.
#[derive(Deserialize)]
struct StateRecord {
    attributes: AttributeCatalog,
    kpi_base: KpiBase,
    program: ValueProgram,
    queues: QueueSet,
}

impl From<StateRecord> for OnboardingState {
    fn from(r: StateRecord) -> Self {
        Self::new(r.attributes, r.kpi_base, r.program, r.queues)
    }
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self::new(
            AttributeCatalog::reference(),
            KpiBase::default(),
            ValueProgram::default(),
            QueueSet::new(),
        )
    }
}

/// Owner of the onboarding state; all writes go through `&mut self`.
#[derive(Debug, Clone)]
pub struct OnboardingStore {
    state: OnboardingState,
    history: ChangeLog,
}

impl Default for OnboardingStore {
    fn default() -> Self {
        Self::new(OnboardingState::default())
    }
}

impl OnboardingStore {
    pub fn new(state: OnboardingState) -> Self {
        Self {
            state,
            history: ChangeLog::new(),
        }
    }

    /// Reference attributes and a points program, with KPI base and history
    /// capacity taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        let state = OnboardingState::new(
            AttributeCatalog::reference(),
            KpiBase::from(config.kpi),
            ValueProgram::default(),
            QueueSet::new(),
        );
        Self {
            state,
            history: ChangeLog::with_max_entries(config.history.max_entries),
        }
    }

    /// Rebuild a session from stored documents. Kinds that are absent keep
    /// their defaults; a later document of the same kind wins.
    pub fn from_documents<'a>(
        docs: impl IntoIterator<Item = &'a RuleDocument>,
        kpi_base: KpiBase,
    ) -> Self {
        let mut attributes = AttributeCatalog::reference();
        let mut base = kpi_base;
        let mut program = ValueProgram::default();
        let mut queues = QueueSet::new();
        for doc in docs {
            match doc {
                RuleDocument::AttributeCatalog(d) => {
                    attributes = d.spec.attributes.clone();
                    base = d.spec.kpi_base.unwrap_or(kpi_base);
                }
                RuleDocument::ValueProgram(d) => program = d.spec.clone(),
                RuleDocument::SignalQueues(d) => queues = d.spec.queues.clone(),
            }
        }
        Self::new(OnboardingState::new(attributes, base, program, queues))
    }

    /// Export the session as one document per kind, ids prefixed with `prefix`.
    pub fn to_documents(&self, prefix: &str, name: &str) -> Vec<RuleDocument> {
        let meta = |kind: DocumentKind, suffix: &str| {
            CommonMetadata::new(format!("{prefix}-{suffix}"), format!("{name} {kind}"))
        };
        vec![
            RuleDocument::attribute_catalog(
                meta(DocumentKind::AttributeCatalog, "attributes"),
                self.state.attributes.clone(),
                Some(self.state.kpi_base),
            ),
            RuleDocument::value_program(
                meta(DocumentKind::ValueProgram, "program"),
                self.state.program.clone(),
            ),
            RuleDocument::signal_queues(
                meta(DocumentKind::SignalQueues, "queues"),
                self.state.queues.clone(),
            ),
        ]
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn attributes(&self) -> &AttributeCatalog {
        &self.state.attributes
    }

    pub fn kpis(&self) -> KpiCounters {
        self.state.kpis
    }

    pub fn program(&self) -> &ValueProgram {
        &self.state.program
    }

    pub fn queues(&self) -> &QueueSet {
        &self.state.queues
    }

    pub fn history(&self) -> &ChangeLog {
        &self.history
    }

    /// Finalize-time report over the whole session.
    pub fn validate(&self) -> ValidationResult {
        let mut report = validation::validate_attributes(&self.state.attributes);
        report.merge(validation::validate_program(&self.state.program));
        report.merge(validation::validate_queues(&self.state.queues));
        report
    }

    // ── Mutation plumbing ───────────────────────────────────────────

    fn mutate<T>(
        &mut self,
        action: ChangeAction,
        target: impl Into<String>,
        f: impl FnOnce(&mut OnboardingState) -> Result<T>,
    ) -> Result<T> {
        let target = target.into();
        let mut next = self.state.clone();
        match f(&mut next) {
            Ok(value) => {
                next.recompute_kpis();
                self.state = next;
                debug!(?action, target = %target, "change committed");
                self.history
                    .record(action, target, ChangeOutcome::Committed, None);
                Ok(value)
            }
            Err(err) => {
                warn!(?action, target = %target, error = %err, "change rejected");
                self.history.record(
                    action,
                    target,
                    ChangeOutcome::Rejected,
                    Some(err.to_string()),
                );
                Err(err)
            }
        }
    }

    // ── Attributes ──────────────────────────────────────────────────

    pub fn set_attribute_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        self.mutate(ChangeAction::ToggleAttribute, name, |s| {
            s.attributes.set_enabled(name, enabled)
        })
    }

    /// Flip an attribute and return its new state.
    pub fn toggle_attribute(&mut self, name: &str) -> Result<bool> {
        self.mutate(ChangeAction::ToggleAttribute, name, |s| s.attributes.toggle(name))
    }

    // ── Value program ───────────────────────────────────────────────

    pub fn set_value_type(&mut self, value_type: ValueType) -> Result<()> {
        self.mutate(ChangeAction::SetValueType, value_type.to_string(), |s| {
            s.program.set_value_type(value_type);
            Ok(())
        })
    }

    pub fn update_value_config(&mut self, patch: &ValueConfigPatch) -> Result<()> {
        self.mutate(ChangeAction::UpdateValueConfig, patch.value_type().to_string(), |s| {
            s.program.update_value_config(patch)
        })
    }

    pub fn set_use_tiers(&mut self, use_tiers: bool) -> Result<()> {
        self.mutate(ChangeAction::SetUseTiers, "", |s| {
            s.program.set_use_tiers(use_tiers);
            Ok(())
        })
    }

    pub fn update_program_earning(&mut self, patch: &EarningRulesPatch) -> Result<()> {
        self.mutate(ChangeAction::UpdateProgramEarning, "", |s| {
            s.program.update_program_earning(patch)
        })
    }

    pub fn add_tier(&mut self, new: NewTier) -> Result<TierId> {
        let name = new.name.clone();
        self.mutate(ChangeAction::AddTier, name, |s| {
            s.program.add_tier(new).map(|t| t.id)
        })
    }

    pub fn update_tier(&mut self, id: TierId, patch: &TierPatch) -> Result<()> {
        self.mutate(ChangeAction::UpdateTier, id.to_string(), |s| {
            s.program.update_tier(id, patch).map(|_| ())
        })
    }

    pub fn remove_tier(&mut self, id: TierId) -> Result<Tier> {
        self.mutate(ChangeAction::RemoveTier, id.to_string(), |s| s.program.remove_tier(id))
    }

    // ── Queues and signals ──────────────────────────────────────────

    pub fn add_queue(&mut self, name: &str, description: &str) -> Result<QueueId> {
        self.mutate(ChangeAction::AddQueue, name, |s| {
            if name.trim().is_empty() {
                return Err(LoyaltyError::invalid_range("queue.name", "must not be empty"));
            }
            Ok(s.queues.add_queue(name.trim(), description))
        })
    }

    pub fn update_queue(&mut self, id: QueueId, patch: &QueuePatch) -> Result<()> {
        self.mutate(ChangeAction::UpdateQueue, id.to_string(), |s| {
            s.queues.update_queue(id, patch).map(|_| ())
        })
    }

    pub fn remove_queue(&mut self, id: QueueId) -> Result<Queue> {
        self.mutate(ChangeAction::RemoveQueue, id.to_string(), |s| s.queues.remove_queue(id))
    }

    /// Open a builder for a new signal in `queue_id`.
    pub fn create_signal(&self, queue_id: QueueId) -> Result<SignalBuilder> {
        if self.state.queues.queue(queue_id).is_none() {
            return Err(LoyaltyError::not_found(ObjectKind::Queue, queue_id));
        }
        Ok(SignalBuilder::create(queue_id))
    }

    /// Open a builder seeded from a stored signal.
    pub fn edit_signal(&self, queue_id: QueueId, signal_id: SignalId) -> Result<SignalBuilder> {
        SignalBuilder::edit(&self.state.queues, queue_id, signal_id)
    }

    /// Save a builder's draft into its queue.
    pub fn save_signal(&mut self, builder: &SignalBuilder) -> Result<SignalId> {
        let target = builder.draft().id().to_string();
        self.mutate(ChangeAction::SaveSignal, target, |s| builder.save(&mut s.queues))
    }

    pub fn update_signal(
        &mut self,
        queue_id: QueueId,
        signal_id: SignalId,
        patch: &SignalPatch,
    ) -> Result<()> {
        self.mutate(ChangeAction::UpdateSignal, signal_id.to_string(), |s| {
            s.queues.update_signal(queue_id, signal_id, patch).map(|_| ())
        })
    }

    pub fn remove_signal(&mut self, queue_id: QueueId, signal_id: SignalId) -> Result<SignalTemplate> {
        self.mutate(ChangeAction::RemoveSignal, signal_id.to_string(), |s| {
            s.queues.remove_signal(queue_id, signal_id)
        })
    }
}
