//! Five-step signal builder: metric → operator → conditions → actions → review.
//!
//! Navigation is free in both directions and never gated on completeness.
//! Only [`SignalBuilder::save`] validates and writes to the owning queue.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use loyalty_core::{LoyaltyError, ObjectKind, QueueId, Result, SignalId};

use crate::queue::QueueSet;

use super::draft::{SignalDraft, SignalPatch};
use super::template::SignalTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderStep {
    Metric,
    Operator,
    Conditions,
    Actions,
    Review,
}

impl BuilderStep {
    pub const ORDER: [BuilderStep; 5] = [
        BuilderStep::Metric,
        BuilderStep::Operator,
        BuilderStep::Conditions,
        BuilderStep::Actions,
        BuilderStep::Review,
    ];

    pub fn index(self) -> usize {
        match self {
            BuilderStep::Metric => 0,
            BuilderStep::Operator => 1,
            BuilderStep::Conditions => 2,
            BuilderStep::Actions => 3,
            BuilderStep::Review => 4,
        }
    }

    /// Following step; the last step maps to itself.
    pub fn next(self) -> BuilderStep {
        Self::ORDER[(self.index() + 1).min(Self::ORDER.len() - 1)]
    }

    /// Preceding step; the first step maps to itself.
    pub fn prev(self) -> BuilderStep {
        Self::ORDER[self.index().saturating_sub(1)]
    }
}

/// Whether a save appends a new template or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderMode {
    Create,
    Edit,
}

/// Editor session for one signal template in one queue.
#[derive(Debug, Clone)]
pub struct SignalBuilder {
    queue_id: QueueId,
    mode: BuilderMode,
    step: BuilderStep,
    draft: SignalDraft,
}

impl SignalBuilder {
    /// Start a new template; its id is generated now and kept across edits.
    pub fn create(queue_id: QueueId) -> Self {
        let draft = SignalDraft::new();
        debug!(queue_id = %queue_id, signal_id = %draft.id(), "signal builder opened (create)");
        Self {
            queue_id,
            mode: BuilderMode::Create,
            step: BuilderStep::Metric,
            draft,
        }
    }

    /// Start editing a stored template; the draft is seeded from its values.
    pub fn edit(queues: &QueueSet, queue_id: QueueId, signal_id: SignalId) -> Result<Self> {
        let queue = queues
            .queue(queue_id)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Queue, queue_id))?;
        let template = queue
            .signal(signal_id)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Signal, signal_id))?;
        debug!(queue_id = %queue_id, signal_id = %signal_id, "signal builder opened (edit)");
        Ok(Self {
            queue_id,
            mode: BuilderMode::Edit,
            step: BuilderStep::Metric,
            draft: SignalDraft::from(template),
        })
    }

    pub fn queue_id(&self) -> QueueId {
        self.queue_id
    }

    pub fn mode(&self) -> BuilderMode {
        self.mode
    }

    pub fn step(&self) -> BuilderStep {
        self.step
    }

    pub fn draft(&self) -> &SignalDraft {
        &self.draft
    }

    pub fn next(&mut self) -> BuilderStep {
        self.step = self.step.next();
        self.step
    }

    pub fn back(&mut self) -> BuilderStep {
        self.step = self.step.prev();
        self.step
    }

    pub fn go_to(&mut self, step: BuilderStep) {
        self.step = step;
    }

    pub fn update(&mut self, patch: &SignalPatch) {
        self.draft.apply(patch);
    }

    pub fn toggle_action(&mut self, action: &str) -> bool {
        self.draft.toggle_action(action)
    }

    /// Materialize the draft for the review step without saving it.
    pub fn preview(&self) -> Result<SignalTemplate> {
        self.draft.materialize()
    }

    /// Validate the draft and hand it to the queue.
    ///
    /// Create appends; edit replaces the template with the same id. On
    /// failure neither the draft nor the queue changes.
    pub fn save(&self, queues: &mut QueueSet) -> Result<SignalId> {
        let template = self.draft.materialize()?;
        let id = template.id();
        match self.mode {
            BuilderMode::Create => {
                queues.add_signal(self.queue_id, template)?;
            }
            BuilderMode::Edit => {
                queues.replace_signal(self.queue_id, template)?;
            }
        }
        info!(queue_id = %self.queue_id, signal_id = %id, mode = ?self.mode, "signal saved");
        Ok(id)
    }

    /// Discard the draft. The stored template is untouched.
    pub fn cancel(self) {
        debug!(queue_id = %self.queue_id, signal_id = %self.draft.id(), "signal builder cancelled");
    }
}
