//! Threshold-based earning used by credits and vouchers programs.

use serde::{Deserialize, Serialize};

use loyalty_core::LoyaltyError;

use super::{check_count, check_non_negative, RuleDefaults, RuleParams, SubRule, SubRulePatch};

/// Reward issued once cumulative spend crosses `spend`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpendThreshold {
    pub spend: f64,
    pub reward: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendThresholdPatch {
    pub spend: Option<f64>,
    pub reward: Option<f64>,
}

impl RuleDefaults for SpendThreshold {
    fn defaults() -> Self {
        Self {
            spend: 100.0,
            reward: 10.0,
        }
    }
}

impl RuleParams for SpendThreshold {
    type Patch = SpendThresholdPatch;

    fn merge(&mut self, patch: &SpendThresholdPatch) {
        if let Some(v) = patch.spend {
            self.spend = v;
        }
        if let Some(v) = patch.reward {
            self.reward = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_non_negative(path, "spend", self.spend, issues);
        check_non_negative(path, "reward", self.reward, issues);
    }
}

/// Reward issued every `purchases` transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PurchaseFrequency {
    pub purchases: f64,
    pub reward: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseFrequencyPatch {
    pub purchases: Option<f64>,
    pub reward: Option<f64>,
}

impl RuleDefaults for PurchaseFrequency {
    fn defaults() -> Self {
        Self {
            purchases: 10.0,
            reward: 5.0,
        }
    }
}

impl RuleParams for PurchaseFrequency {
    type Patch = PurchaseFrequencyPatch;

    fn merge(&mut self, patch: &PurchaseFrequencyPatch) {
        if let Some(v) = patch.purchases {
            self.purchases = v;
        }
        if let Some(v) = patch.reward {
            self.reward = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_count(path, "purchases", self.purchases, issues);
        check_non_negative(path, "reward", self.reward, issues);
    }
}

/// Accounting period for [`PeriodSpend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningPeriod {
    Monthly,
    Quarterly,
    Annual,
}

/// Reward issued when spend within one period reaches `spend`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodSpend {
    pub spend: f64,
    pub period: EarningPeriod,
    pub reward: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSpendPatch {
    pub spend: Option<f64>,
    pub period: Option<EarningPeriod>,
    pub reward: Option<f64>,
}

impl RuleDefaults for PeriodSpend {
    fn defaults() -> Self {
        Self {
            spend: 500.0,
            period: EarningPeriod::Monthly,
            reward: 25.0,
        }
    }
}

impl RuleParams for PeriodSpend {
    type Patch = PeriodSpendPatch;

    fn merge(&mut self, patch: &PeriodSpendPatch) {
        if let Some(v) = patch.spend {
            self.spend = v;
        }
        if let Some(v) = patch.period {
            self.period = v;
        }
        if let Some(v) = patch.reward {
            self.reward = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_non_negative(path, "spend", self.spend, issues);
        check_non_negative(path, "reward", self.reward, issues);
    }
}

// ── Group ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdEarning {
    pub spend_threshold: SubRule<SpendThreshold>,
    pub purchase_frequency: SubRule<PurchaseFrequency>,
    pub period_spend: SubRule<PeriodSpend>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdEarningPatch {
    pub spend_threshold: Option<SubRulePatch<SpendThresholdPatch>>,
    pub purchase_frequency: Option<SubRulePatch<PurchaseFrequencyPatch>>,
    pub period_spend: Option<SubRulePatch<PeriodSpendPatch>>,
}

impl ThresholdEarning {
    pub(super) fn apply(&mut self, patch: &ThresholdEarningPatch) {
        if let Some(p) = &patch.spend_threshold {
            self.spend_threshold.apply(p);
        }
        if let Some(p) = &patch.purchase_frequency {
            self.purchase_frequency.apply(p);
        }
        if let Some(p) = &patch.period_spend {
            self.period_spend.apply(p);
        }
    }

    pub(super) fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        self.spend_threshold
            .collect_issues(&format!("{path}.spend_threshold"), issues);
        self.purchase_frequency
            .collect_issues(&format!("{path}.purchase_frequency"), issues);
        self.period_spend
            .collect_issues(&format!("{path}.period_spend"), issues);
    }

    pub fn any_enabled(&self) -> bool {
        self.spend_threshold.enabled || self.purchase_frequency.enabled || self.period_spend.enabled
    }
}
