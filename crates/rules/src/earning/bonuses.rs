//! Behavioral bonuses: rewards for visits, spend, birthdays and first purchases.

use serde::{Deserialize, Serialize};
use tracing::debug;

use loyalty_core::LoyaltyError;

use super::{
    check_count, check_non_negative, check_positive, RuleDefaults, RuleParams, SubRule,
    SubRulePatch,
};

/// Bonus points after `visits` visits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitFrequencyBonus {
    pub visits: f64,
    pub points: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitFrequencyPatch {
    pub visits: Option<f64>,
    pub points: Option<f64>,
}

impl RuleDefaults for VisitFrequencyBonus {
    fn defaults() -> Self {
        Self {
            visits: 5.0,
            points: 50.0,
        }
    }
}

impl RuleParams for VisitFrequencyBonus {
    type Patch = VisitFrequencyPatch;

    fn merge(&mut self, patch: &VisitFrequencyPatch) {
        if let Some(v) = patch.visits {
            self.visits = v;
        }
        if let Some(v) = patch.points {
            self.points = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_count(path, "visits", self.visits, issues);
        check_non_negative(path, "points", self.points, issues);
    }
}

/// Bonus points for a single purchase of at least `spend`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpendBonus {
    pub spend: f64,
    pub points: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendBonusPatch {
    pub spend: Option<f64>,
    pub points: Option<f64>,
}

impl RuleDefaults for SpendBonus {
    fn defaults() -> Self {
        Self {
            spend: 100.0,
            points: 100.0,
        }
    }
}

impl RuleParams for SpendBonus {
    type Patch = SpendBonusPatch;

    fn merge(&mut self, patch: &SpendBonusPatch) {
        if let Some(v) = patch.spend {
            self.spend = v;
        }
        if let Some(v) = patch.points {
            self.points = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_non_negative(path, "spend", self.spend, issues);
        check_non_negative(path, "points", self.points, issues);
    }
}

// ── Birthday ────────────────────────────────────────────────────────

/// Discriminant of [`BirthdayReward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthdayRewardKind {
    Multiplier,
    Points,
    Voucher,
}

/// What a member receives on their birthday.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reward_type", rename_all = "snake_case")]
pub enum BirthdayReward {
    /// Earn-rate multiplier applied for the birthday.
    Multiplier { multiplier: f64 },
    Points { points: f64 },
    Voucher { voucher_value: f64 },
}

impl BirthdayReward {
    pub fn kind(&self) -> BirthdayRewardKind {
        match self {
            BirthdayReward::Multiplier { .. } => BirthdayRewardKind::Multiplier,
            BirthdayReward::Points { .. } => BirthdayRewardKind::Points,
            BirthdayReward::Voucher { .. } => BirthdayRewardKind::Voucher,
        }
    }

    /// Default reward of the given kind.
    pub fn default_for(kind: BirthdayRewardKind) -> Self {
        match kind {
            BirthdayRewardKind::Multiplier => BirthdayReward::Multiplier { multiplier: 2.0 },
            BirthdayRewardKind::Points => BirthdayReward::Points { points: 100.0 },
            BirthdayRewardKind::Voucher => BirthdayReward::Voucher { voucher_value: 10.0 },
        }
    }
}

/// Type-aware partial update of the birthday reward.
///
/// `reward_type` switches the variant first; value fields that do not
/// belong to the resulting variant are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirthdayPatch {
    pub reward_type: Option<BirthdayRewardKind>,
    pub multiplier: Option<f64>,
    pub points: Option<f64>,
    pub voucher_value: Option<f64>,
}

impl RuleDefaults for BirthdayReward {
    fn defaults() -> Self {
        BirthdayReward::default_for(BirthdayRewardKind::Points)
    }
}

impl RuleParams for BirthdayReward {
    type Patch = BirthdayPatch;

    fn merge(&mut self, patch: &BirthdayPatch) {
        if let Some(kind) = patch.reward_type {
            if kind != self.kind() {
                *self = BirthdayReward::default_for(kind);
            }
        }
        match self {
            BirthdayReward::Multiplier { multiplier } => {
                if let Some(v) = patch.multiplier {
                    *multiplier = v;
                }
            }
            BirthdayReward::Points { points } => {
                if let Some(v) = patch.points {
                    *points = v;
                }
            }
            BirthdayReward::Voucher { voucher_value } => {
                if let Some(v) = patch.voucher_value {
                    *voucher_value = v;
                }
            }
        }
        let foreign = match self.kind() {
            BirthdayRewardKind::Multiplier => patch.points.is_some() || patch.voucher_value.is_some(),
            BirthdayRewardKind::Points => patch.multiplier.is_some() || patch.voucher_value.is_some(),
            BirthdayRewardKind::Voucher => patch.multiplier.is_some() || patch.points.is_some(),
        };
        if foreign {
            debug!(reward_type = ?self.kind(), "ignoring birthday fields of another reward type");
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        match self {
            BirthdayReward::Multiplier { multiplier } => {
                check_positive(path, "multiplier", *multiplier, issues)
            }
            BirthdayReward::Points { points } => check_non_negative(path, "points", *points, issues),
            BirthdayReward::Voucher { voucher_value } => {
                check_non_negative(path, "voucher_value", *voucher_value, issues)
            }
        }
    }
}

// ── First purchase ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirstPurchaseBonus {
    pub points: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstPurchasePatch {
    pub points: Option<f64>,
}

impl RuleDefaults for FirstPurchaseBonus {
    fn defaults() -> Self {
        Self { points: 50.0 }
    }
}

impl RuleParams for FirstPurchaseBonus {
    type Patch = FirstPurchasePatch;

    fn merge(&mut self, patch: &FirstPurchasePatch) {
        if let Some(v) = patch.points {
            self.points = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_non_negative(path, "points", self.points, issues);
    }
}

// ── Group ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehavioralBonuses {
    pub frequency: SubRule<VisitFrequencyBonus>,
    pub spend_threshold: SubRule<SpendBonus>,
    pub birthday: SubRule<BirthdayReward>,
    pub first_purchase: SubRule<FirstPurchaseBonus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralBonusesPatch {
    pub frequency: Option<SubRulePatch<VisitFrequencyPatch>>,
    pub spend_threshold: Option<SubRulePatch<SpendBonusPatch>>,
    pub birthday: Option<SubRulePatch<BirthdayPatch>>,
    pub first_purchase: Option<SubRulePatch<FirstPurchasePatch>>,
}

impl BehavioralBonuses {
    pub(super) fn apply(&mut self, patch: &BehavioralBonusesPatch) {
        if let Some(p) = &patch.frequency {
            self.frequency.apply(p);
        }
        if let Some(p) = &patch.spend_threshold {
            self.spend_threshold.apply(p);
        }
        if let Some(p) = &patch.birthday {
            self.birthday.apply(p);
        }
        if let Some(p) = &patch.first_purchase {
            self.first_purchase.apply(p);
        }
    }

    pub(super) fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        self.frequency
            .collect_issues(&format!("{path}.frequency"), issues);
        self.spend_threshold
            .collect_issues(&format!("{path}.spend_threshold"), issues);
        self.birthday
            .collect_issues(&format!("{path}.birthday"), issues);
        self.first_purchase
            .collect_issues(&format!("{path}.first_purchase"), issues);
    }
}
