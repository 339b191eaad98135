//! In-progress signal drafts and partial updates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use loyalty_core::{LoyaltyError, Result, SignalId};

use super::template::{
    AnalysisOperator, ConditionKind, Metric, PeriodKind, Priority, SignalTemplate, TimeWindow,
    TriggerCondition, Unit,
};

pub(crate) const DEFAULT_COOLDOWN_HOURS: f64 = 24.0;

/// Partial update of a signal draft or a stored template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub metric: Option<Metric>,
    pub operator: Option<AnalysisOperator>,
    pub period: Option<PeriodKind>,
    pub custom_period_days: Option<u32>,
    pub condition: Option<ConditionKind>,
    pub threshold: Option<f64>,
    pub threshold_max: Option<f64>,
    pub unit: Option<Unit>,
    pub priority: Option<Priority>,
    /// Replaces the whole action set.
    pub actions: Option<BTreeSet<String>>,
    pub cooldown_hours: Option<f64>,
}

/// Incomplete signal template edited across builder steps.
///
/// Fields that only matter for one variant (`threshold_max`,
/// `custom_period_days`) are kept while another variant is selected, so
/// switching back restores them. They are dropped on materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDraft {
    id: SignalId,
    pub name: Option<String>,
    pub description: String,
    pub enabled: bool,
    pub metric: Option<Metric>,
    pub operator: Option<AnalysisOperator>,
    pub period: Option<PeriodKind>,
    pub custom_period_days: Option<u32>,
    pub condition: Option<ConditionKind>,
    pub threshold: Option<f64>,
    pub threshold_max: Option<f64>,
    pub unit: Option<Unit>,
    pub priority: Option<Priority>,
    pub actions: BTreeSet<String>,
    pub cooldown_hours: f64,
}

impl Default for SignalDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalDraft {
    /// Fresh draft with a newly generated id and builder defaults.
    pub fn new() -> Self {
        Self {
            id: SignalId::new(),
            name: None,
            description: String::new(),
            enabled: true,
            metric: None,
            operator: None,
            period: Some(PeriodKind::Last7Days),
            custom_period_days: None,
            condition: Some(ConditionKind::GreaterThan),
            threshold: None,
            threshold_max: None,
            unit: None,
            priority: Some(Priority::Medium),
            actions: BTreeSet::new(),
            cooldown_hours: DEFAULT_COOLDOWN_HOURS,
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn apply(&mut self, patch: &SignalPatch) {
        if let Some(v) = &patch.name {
            self.name = Some(v.clone());
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = patch.enabled {
            self.enabled = v;
        }
        if let Some(v) = patch.metric {
            self.metric = Some(v);
        }
        if let Some(v) = patch.operator {
            self.operator = Some(v);
        }
        if let Some(v) = patch.period {
            self.period = Some(v);
        }
        if let Some(v) = patch.custom_period_days {
            self.custom_period_days = Some(v);
        }
        if let Some(v) = patch.condition {
            self.condition = Some(v);
        }
        if let Some(v) = patch.threshold {
            self.threshold = Some(v);
        }
        if let Some(v) = patch.threshold_max {
            self.threshold_max = Some(v);
        }
        if let Some(v) = patch.unit {
            self.unit = Some(v);
        }
        if let Some(v) = patch.priority {
            self.priority = Some(v);
        }
        if let Some(v) = &patch.actions {
            self.actions = v.clone();
        }
        if let Some(v) = patch.cooldown_hours {
            self.cooldown_hours = v;
        }
    }

    /// Add the action if absent, remove it otherwise. Returns whether it is now selected.
    pub fn toggle_action(&mut self, action: &str) -> bool {
        if self.actions.remove(action) {
            false
        } else {
            self.actions.insert(action.to_string());
            true
        }
    }

    /// Required fields still unset, in builder order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            missing.push("name");
        }
        if self.metric.is_none() {
            missing.push("metric");
        }
        if self.operator.is_none() {
            missing.push("operator");
        }
        match self.period {
            None => missing.push("period"),
            Some(PeriodKind::Custom) if self.custom_period_days.is_none() => {
                missing.push("custom_period_days")
            }
            Some(_) => {}
        }
        if self.condition.is_none() {
            missing.push("condition");
        }
        if self.threshold.is_none() {
            missing.push("threshold");
        }
        if self.condition == Some(ConditionKind::Between) && self.threshold_max.is_none() {
            missing.push("threshold_max");
        }
        if self.unit.is_none() {
            missing.push("unit");
        }
        if self.priority.is_none() {
            missing.push("priority");
        }
        if self.actions.is_empty() {
            missing.push("actions");
        }
        missing
    }

    /// Build the complete template, or report what is missing or out of range.
    pub fn materialize(&self) -> Result<SignalTemplate> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(LoyaltyError::IncompleteTemplate { missing });
        }

        let (
            Some(name),
            Some(metric),
            Some(operator),
            Some(period),
            Some(condition),
            Some(threshold),
            Some(unit),
            Some(priority),
        ) = (
            self.name.as_deref(),
            self.metric,
            self.operator,
            self.period,
            self.condition,
            self.threshold,
            self.unit,
            self.priority,
        )
        else {
            return Err(LoyaltyError::IncompleteTemplate {
                missing: self.missing_fields(),
            });
        };

        if !threshold.is_finite() {
            return Err(LoyaltyError::invalid_range("threshold", "must be a finite number"));
        }
        if !self.cooldown_hours.is_finite() || self.cooldown_hours < 0.0 {
            return Err(LoyaltyError::invalid_range(
                "cooldown_hours",
                format!("must be a non-negative number, got {}", self.cooldown_hours),
            ));
        }

        let window = match period {
            PeriodKind::Last24Hours => TimeWindow::Last24Hours,
            PeriodKind::Last7Days => TimeWindow::Last7Days,
            PeriodKind::Last30Days => TimeWindow::Last30Days,
            PeriodKind::Last90Days => TimeWindow::Last90Days,
            PeriodKind::Custom => {
                let days = self.custom_period_days.unwrap_or_default();
                if days == 0 {
                    return Err(LoyaltyError::invalid_range(
                        "custom_period_days",
                        "must be at least one day",
                    ));
                }
                TimeWindow::Custom {
                    custom_period_days: days,
                }
            }
        };

        let condition = match condition {
            ConditionKind::GreaterThan => TriggerCondition::GreaterThan { threshold },
            ConditionKind::LessThan => TriggerCondition::LessThan { threshold },
            ConditionKind::Equals => TriggerCondition::Equals { threshold },
            ConditionKind::Between => {
                let Some(threshold_max) = self
                    .threshold_max
                    .filter(|max| max.is_finite() && threshold < *max)
                else {
                    return Err(LoyaltyError::invalid_range(
                        "threshold_max",
                        format!(
                            "between requires threshold < threshold_max, got {} and {:?}",
                            threshold, self.threshold_max
                        ),
                    ));
                };
                TriggerCondition::Between {
                    threshold,
                    threshold_max,
                }
            }
        };

        Ok(SignalTemplate {
            id: self.id,
            name: name.trim().to_string(),
            description: self.description.clone(),
            enabled: self.enabled,
            metric,
            operator,
            window,
            condition,
            unit,
            priority,
            actions: self.actions.clone(),
            cooldown_hours: self.cooldown_hours,
        })
    }
}

impl From<&SignalTemplate> for SignalDraft {
    /// Seed a draft from a stored template, keeping its id.
    fn from(t: &SignalTemplate) -> Self {
        let custom_period_days = match t.window {
            TimeWindow::Custom { custom_period_days } => Some(custom_period_days),
            _ => None,
        };
        Self {
            id: t.id,
            name: Some(t.name.clone()),
            description: t.description.clone(),
            enabled: t.enabled,
            metric: Some(t.metric),
            operator: Some(t.operator),
            period: Some(t.window.kind()),
            custom_period_days,
            condition: Some(t.condition.kind()),
            threshold: Some(t.condition.threshold()),
            threshold_max: t.condition.threshold_max(),
            unit: Some(t.unit),
            priority: Some(t.priority),
            actions: t.actions.clone(),
            cooldown_hours: t.cooldown_hours,
        }
    }
}
