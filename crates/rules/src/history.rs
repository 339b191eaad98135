//! In-memory change log for onboarding mutations.
//!
//! Entries are capped at a configurable maximum (default 200) with FIFO
//! eviction. Every mutation attempt is recorded, including rejected ones.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Whether the mutation was applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOutcome {
    Committed,
    Rejected,
}

/// Kind of mutation recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    ToggleAttribute,
    SetValueType,
    UpdateValueConfig,
    SetUseTiers,
    UpdateProgramEarning,
    AddTier,
    UpdateTier,
    RemoveTier,
    AddQueue,
    UpdateQueue,
    RemoveQueue,
    SaveSignal,
    UpdateSignal,
    RemoveSignal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeEntry {
    pub timestamp: DateTime<Utc>,
    pub action: ChangeAction,
    /// Id or name of the object touched, empty for program-wide changes.
    pub target: String,
    pub outcome: ChangeOutcome,
    /// Error text for rejected changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Filter for [`ChangeLog::query`].
#[derive(Debug, Default, Deserialize)]
pub struct ChangeQuery {
    pub action: Option<ChangeAction>,
    pub outcome: Option<ChangeOutcome>,
    /// Maximum number of entries to return (default 100).
    pub limit: Option<usize>,
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ChangeLog {
    entries: VecDeque<ChangeEntry>,
    max_entries: usize,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    pub fn record(
        &mut self,
        action: ChangeAction,
        target: impl Into<String>,
        outcome: ChangeOutcome,
        message: Option<String>,
    ) {
        self.entries.push_back(ChangeEntry {
            timestamp: Utc::now(),
            action,
            target: target.into(),
            outcome,
            message,
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Matching entries, newest first.
    pub fn query(&self, query: &ChangeQuery) -> Vec<ChangeEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| query.action.map_or(true, |a| e.action == a))
            .filter(|e| query.outcome.map_or(true, |o| e.outcome == o))
            .filter(|e| query.since.map_or(true, |s| e.timestamp >= s))
            .take(query.limit.unwrap_or(100))
            .cloned()
            .collect()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ChangeEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChangeEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut log = ChangeLog::with_max_entries(3);
        for i in 0..5 {
            log.record(ChangeAction::AddTier, format!("tier-{i}"), ChangeOutcome::Committed, None);
        }
        let targets: Vec<&str> = log.entries().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["tier-2", "tier-3", "tier-4"]);
    }

    #[test]
    fn query_filters_newest_first() {
        let mut log = ChangeLog::new();
        log.record(ChangeAction::AddTier, "gold", ChangeOutcome::Committed, None);
        log.record(
            ChangeAction::AddTier,
            "gold",
            ChangeOutcome::Rejected,
            Some("duplicate".to_string()),
        );
        log.record(ChangeAction::RemoveTier, "silver", ChangeOutcome::Rejected, None);

        let rejected = log.query(&ChangeQuery {
            outcome: Some(ChangeOutcome::Rejected),
            ..Default::default()
        });
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].action, ChangeAction::RemoveTier);

        let limited = log.query(&ChangeQuery {
            action: Some(ChangeAction::AddTier),
            limit: Some(1),
            ..Default::default()
        });
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].outcome, ChangeOutcome::Rejected);
    }

    #[test]
    fn since_filter_excludes_older_entries() {
        let mut log = ChangeLog::new();
        log.record(ChangeAction::SetUseTiers, "", ChangeOutcome::Committed, None);
        let future = Utc::now() + chrono::Duration::hours(1);
        let none = log.query(&ChangeQuery {
            since: Some(future),
            ..Default::default()
        });
        assert!(none.is_empty());
    }

    #[test]
    fn entries_serialize_without_empty_message() {
        let mut log = ChangeLog::new();
        log.record(ChangeAction::SaveSignal, "abc", ChangeOutcome::Committed, None);
        let json = serde_json::to_value(log.last().unwrap()).unwrap();
        assert_eq!(json["action"], "save_signal");
        assert_eq!(json["outcome"], "committed");
        assert!(json.get("message").is_none());
    }
}
