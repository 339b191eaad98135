//! Signal template types: metric, analysis operator, time window, trigger
//! condition, unit, priority and the complete template.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use loyalty_core::{Result, SignalId};

use super::draft::{SignalDraft, SignalPatch};

// ── Metric catalog ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Engagement,
    Revenue,
    Redemption,
    Fraud,
    Churn,
}

/// Observed program metric a signal watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ActiveMembers,
    VisitFrequency,
    EnrollmentRate,
    AverageTransactionValue,
    RevenuePerMember,
    SpendVelocity,
    RedemptionRate,
    PointsLiability,
    BreakageRate,
    PointsVelocity,
    ReturnRate,
    AccountSharing,
    InactiveMembers,
    DaysSinceLastVisit,
    TierDowngrades,
}

impl Metric {
    pub const ALL: [Metric; 15] = [
        Metric::ActiveMembers,
        Metric::VisitFrequency,
        Metric::EnrollmentRate,
        Metric::AverageTransactionValue,
        Metric::RevenuePerMember,
        Metric::SpendVelocity,
        Metric::RedemptionRate,
        Metric::PointsLiability,
        Metric::BreakageRate,
        Metric::PointsVelocity,
        Metric::ReturnRate,
        Metric::AccountSharing,
        Metric::InactiveMembers,
        Metric::DaysSinceLastVisit,
        Metric::TierDowngrades,
    ];

    pub fn category(self) -> MetricCategory {
        match self {
            Metric::ActiveMembers | Metric::VisitFrequency | Metric::EnrollmentRate => {
                MetricCategory::Engagement
            }
            Metric::AverageTransactionValue | Metric::RevenuePerMember | Metric::SpendVelocity => {
                MetricCategory::Revenue
            }
            Metric::RedemptionRate | Metric::PointsLiability | Metric::BreakageRate => {
                MetricCategory::Redemption
            }
            Metric::PointsVelocity | Metric::ReturnRate | Metric::AccountSharing => {
                MetricCategory::Fraud
            }
            Metric::InactiveMembers | Metric::DaysSinceLastVisit | Metric::TierDowngrades => {
                MetricCategory::Churn
            }
        }
    }

    /// Unit the metric is naturally expressed in.
    pub fn natural_unit(self) -> Unit {
        match self {
            Metric::EnrollmentRate
            | Metric::RedemptionRate
            | Metric::BreakageRate
            | Metric::ReturnRate => Unit::Percentage,
            Metric::AverageTransactionValue
            | Metric::RevenuePerMember
            | Metric::SpendVelocity
            | Metric::PointsLiability => Unit::Currency,
            Metric::ActiveMembers
            | Metric::InactiveMembers
            | Metric::TierDowngrades
            | Metric::AccountSharing => Unit::Count,
            Metric::VisitFrequency | Metric::PointsVelocity | Metric::DaysSinceLastVisit => {
                Unit::Absolute
            }
        }
    }

    pub fn in_category(category: MetricCategory) -> impl Iterator<Item = Metric> {
        Metric::ALL.into_iter().filter(move |m| m.category() == category)
    }
}

// ── Analysis and trigger ────────────────────────────────────────────

/// How the metric series is analysed before the condition is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOperator {
    Trend,
    PercentageChange,
    ThresholdBreach,
    Comparative,
    Anomaly,
    Absolute,
}

/// Discriminant of [`TimeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "custom")]
    Custom,
}

/// Analysis window. `custom_period_days` only exists for custom windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "period")]
pub enum TimeWindow {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "custom")]
    Custom { custom_period_days: u32 },
}

impl TimeWindow {
    pub fn kind(&self) -> PeriodKind {
        match self {
            TimeWindow::Last24Hours => PeriodKind::Last24Hours,
            TimeWindow::Last7Days => PeriodKind::Last7Days,
            TimeWindow::Last30Days => PeriodKind::Last30Days,
            TimeWindow::Last90Days => PeriodKind::Last90Days,
            TimeWindow::Custom { .. } => PeriodKind::Custom,
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            TimeWindow::Last24Hours => 1,
            TimeWindow::Last7Days => 7,
            TimeWindow::Last30Days => 30,
            TimeWindow::Last90Days => 90,
            TimeWindow::Custom { custom_period_days } => *custom_period_days,
        }
    }
}

/// Discriminant of [`TriggerCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    GreaterThan,
    LessThan,
    Equals,
    Between,
}

/// Trigger condition. `threshold_max` only exists for `between`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum TriggerCondition {
    GreaterThan { threshold: f64 },
    LessThan { threshold: f64 },
    Equals { threshold: f64 },
    Between { threshold: f64, threshold_max: f64 },
}

impl TriggerCondition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            TriggerCondition::GreaterThan { .. } => ConditionKind::GreaterThan,
            TriggerCondition::LessThan { .. } => ConditionKind::LessThan,
            TriggerCondition::Equals { .. } => ConditionKind::Equals,
            TriggerCondition::Between { .. } => ConditionKind::Between,
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            TriggerCondition::GreaterThan { threshold }
            | TriggerCondition::LessThan { threshold }
            | TriggerCondition::Equals { threshold }
            | TriggerCondition::Between { threshold, .. } => *threshold,
        }
    }

    pub fn threshold_max(&self) -> Option<f64> {
        match self {
            TriggerCondition::Between { threshold_max, .. } => Some(*threshold_max),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Percentage,
    Currency,
    Count,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Actions the execution side knows how to run. Others are accepted but
/// flagged during validation.
pub const KNOWN_ACTIONS: &[&str] = &[
    "notify_team",
    "send_email",
    "send_sms",
    "send_push",
    "create_ticket",
    "flag_account",
    "freeze_points",
    "award_bonus",
    "send_offer",
    "escalate",
    "webhook",
];

// ── Template ────────────────────────────────────────────────────────

/// A complete alert/detection rule definition.
///
/// The id is fixed at creation; every other field is updated in place via
/// [`SignalTemplate::merged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTemplate {
    pub(crate) id: SignalId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "crate::signal::default_true")]
    pub enabled: bool,
    pub metric: Metric,
    pub operator: AnalysisOperator,
    #[serde(flatten)]
    pub window: TimeWindow,
    #[serde(flatten)]
    pub condition: TriggerCondition,
    pub unit: Unit,
    pub priority: Priority,
    pub actions: BTreeSet<String>,
    pub cooldown_hours: f64,
}

impl SignalTemplate {
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Return a copy with `patch` merged in, keeping the id.
    ///
    /// The result is re-validated exactly like a wizard save.
    pub fn merged(&self, patch: &SignalPatch) -> Result<SignalTemplate> {
        let mut draft = SignalDraft::from(self);
        draft.apply(patch);
        draft.materialize()
    }
}
