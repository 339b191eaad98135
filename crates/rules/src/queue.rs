//! Signal queues: named, ordered buckets of signal templates.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use loyalty_core::{LoyaltyError, ObjectKind, QueueId, Result, SignalId};

use crate::signal::{SignalPatch, SignalTemplate};

/// One operational intelligence domain, e.g. fraud or churn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Queue {
    id: QueueId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "crate::signal::default_true")]
    pub enabled: bool,
    /// Insertion order; there is no reordering operation.
    #[serde(default)]
    signals: Vec<SignalTemplate>,
}

impl Queue {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: QueueId::new(),
            name: name.into(),
            description: description.into(),
            enabled: true,
            signals: Vec::new(),
        }
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn signals(&self) -> &[SignalTemplate] {
        &self.signals
    }

    pub fn signal(&self, id: SignalId) -> Option<&SignalTemplate> {
        self.signals.iter().find(|s| s.id() == id)
    }

    fn signal_index(&self, id: SignalId) -> Result<usize> {
        self.signals
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Signal, id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueuePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

/// Every queue of the onboarding session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueSet {
    queues: Vec<Queue>,
}

impl QueueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queues(&self) -> &[Queue] {
        &self.queues
    }

    pub fn queue(&self, id: QueueId) -> Option<&Queue> {
        self.queues.iter().find(|q| q.id == id)
    }

    pub fn signal_count(&self) -> usize {
        self.queues.iter().map(|q| q.signals.len()).sum()
    }

    /// Locate a signal in whichever queue holds it.
    pub fn find_signal(&self, id: SignalId) -> Option<(&Queue, &SignalTemplate)> {
        self.queues
            .iter()
            .find_map(|q| q.signal(id).map(|s| (q, s)))
    }

    pub fn add_queue(&mut self, name: impl Into<String>, description: impl Into<String>) -> QueueId {
        let queue = Queue::new(name, description);
        let id = queue.id;
        info!(queue_id = %id, name = %queue.name, "added queue");
        self.queues.push(queue);
        id
    }

    pub fn update_queue(&mut self, id: QueueId, patch: &QueuePatch) -> Result<&Queue> {
        let queue = self.queue_mut(id)?;
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(LoyaltyError::invalid_range("queue.name", "must not be empty"));
            }
            queue.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            queue.description = description.clone();
        }
        if let Some(enabled) = patch.enabled {
            queue.enabled = enabled;
        }
        debug!(queue_id = %id, "updated queue");
        Ok(queue)
    }

    pub fn set_queue_enabled(&mut self, id: QueueId, enabled: bool) -> Result<()> {
        self.queue_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Remove a queue and all its signals; unknown ids are `NotFound`.
    pub fn remove_queue(&mut self, id: QueueId) -> Result<Queue> {
        let index = self
            .queues
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Queue, id))?;
        let queue = self.queues.remove(index);
        info!(queue_id = %id, signals = queue.signals.len(), "removed queue");
        Ok(queue)
    }

    /// Append a template to the end of a queue. Signal ids are unique across
    /// the whole set.
    pub fn add_signal(&mut self, queue_id: QueueId, template: SignalTemplate) -> Result<&SignalTemplate> {
        if self.find_signal(template.id()).is_some() {
            return Err(LoyaltyError::DuplicateId {
                kind: ObjectKind::Signal,
                id: template.id().to_string(),
            });
        }
        let queue = self.queue_mut(queue_id)?;
        info!(queue_id = %queue_id, signal_id = %template.id(), name = %template.name, "added signal");
        queue.signals.push(template);
        let last = queue.signals.len() - 1;
        Ok(&queue.signals[last])
    }

    /// Merge `patch` into a stored template in place, keeping its id and position.
    pub fn update_signal(
        &mut self,
        queue_id: QueueId,
        signal_id: SignalId,
        patch: &SignalPatch,
    ) -> Result<&SignalTemplate> {
        let queue = self.queue_mut(queue_id)?;
        let index = queue.signal_index(signal_id)?;
        let next = queue.signals[index].merged(patch)?;
        queue.signals[index] = next;
        debug!(queue_id = %queue_id, signal_id = %signal_id, "updated signal");
        Ok(&queue.signals[index])
    }

    /// Replace the stored template that has the same id.
    pub fn replace_signal(&mut self, queue_id: QueueId, template: SignalTemplate) -> Result<&SignalTemplate> {
        let queue = self.queue_mut(queue_id)?;
        let index = queue.signal_index(template.id())?;
        debug!(queue_id = %queue_id, signal_id = %template.id(), "replaced signal");
        queue.signals[index] = template;
        Ok(&queue.signals[index])
    }

    /// Remove a template; unknown ids are `NotFound`.
    pub fn remove_signal(&mut self, queue_id: QueueId, signal_id: SignalId) -> Result<SignalTemplate> {
        let queue = self.queue_mut(queue_id)?;
        let index = queue.signal_index(signal_id)?;
        let removed = queue.signals.remove(index);
        info!(queue_id = %queue_id, signal_id = %signal_id, "removed signal");
        Ok(removed)
    }

    fn queue_mut(&mut self, id: QueueId) -> Result<&mut Queue> {
        self.queues
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Queue, id))
    }
}
