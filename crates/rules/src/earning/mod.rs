//! Earning rules: how value accrues for a program or a single tier.
//!
//! The model is split into independently merged groups:
//! - base rate and category multipliers (continuous value types)
//! - threshold earning (threshold-based value types)
//! - behavioral bonuses (all value types)
//!
//! Every optional rule is a [`SubRule`]: a soft-disable wrapper whose
//! parameters survive disabling and are filled from [`RuleDefaults`] on the
//! first enable.

mod bonuses;
mod threshold;


pub use bonuses::*;
pub use threshold::*;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use loyalty_core::{LoyaltyError, Result};

// ── Sub-rule plumbing ───────────────────────────────────────────────

/// Single default factory for a sub-rule's parameters.
pub trait RuleDefaults: Sized {
    fn defaults() -> Self;
}

/// Parameters of a sub-rule: mergeable from a typed partial and checkable.
pub trait RuleParams: RuleDefaults + Clone {
    type Patch;

    /// Merge the fields present in `patch`; absent fields keep their value.
    fn merge(&mut self, patch: &Self::Patch);

    /// Push every range violation found under `path`.
    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>);
}

/// An independently enablable rule whose parameters survive disabling.
///
/// Deserialization fills defaults for an enabled rule without params, so an
/// enabled sub-rule always carries parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RawSubRule<T>",
    bound(deserialize = "T: RuleDefaults + Deserialize<'de>")
)]
pub struct SubRule<T> {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<T>,
}

/// Wire shape of [`SubRule`] before normalization.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RawSubRule<T> {
    #[serde(default)]
    enabled: bool,
    params: Option<T>,
}

impl<T: RuleDefaults> From<RawSubRule<T>> for SubRule<T> {
    fn from(raw: RawSubRule<T>) -> Self {
        let params = match raw.params {
            None if raw.enabled => Some(T::defaults()),
            other => other,
        };
        Self {
            enabled: raw.enabled,
            params,
        }
    }
}

impl<T> Default for SubRule<T> {
    fn default() -> Self {
        Self {
            enabled: false,
            params: None,
        }
    }
}

impl<T: RuleParams> SubRule<T> {
    /// Enabled sub-rule with default parameters.
    pub fn enabled_with_defaults() -> Self {
        Self {
            enabled: true,
            params: Some(T::defaults()),
        }
    }

    pub fn enable(&mut self) {
        self.params.get_or_insert_with(T::defaults);
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Parameters in effect, `None` while disabled.
    pub fn active(&self) -> Option<&T> {
        if self.enabled { self.params.as_ref() } else { None }
    }

    fn apply(&mut self, patch: &SubRulePatch<T::Patch>) {
        if let Some(p) = &patch.params {
            self.params.get_or_insert_with(T::defaults).merge(p);
        }
        match patch.enabled {
            Some(true) => self.enable(),
            Some(false) => self.disable(),
            None => {}
        }
    }

    pub fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        match &self.params {
            Some(params) => params.collect_issues(path, issues),
            None if self.enabled => issues.push(LoyaltyError::invalid_range(
                path,
                "enabled sub-rule has no parameters",
            )),
            None => {}
        }
    }
}

/// Partial update of one sub-rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubRulePatch<P> {
    pub enabled: Option<bool>,
    pub params: Option<P>,
}

impl<P> Default for SubRulePatch<P> {
    fn default() -> Self {
        Self {
            enabled: None,
            params: None,
        }
    }
}

impl<P> SubRulePatch<P> {
    pub fn enable() -> Self {
        Self {
            enabled: Some(true),
            params: None,
        }
    }

    pub fn disable() -> Self {
        Self {
            enabled: Some(false),
            params: None,
        }
    }

    pub fn params(params: P) -> Self {
        Self {
            enabled: None,
            params: Some(params),
        }
    }

    pub fn enable_with(params: P) -> Self {
        Self {
            enabled: Some(true),
            params: Some(params),
        }
    }
}

// ── Range checks ────────────────────────────────────────────────────

pub(crate) fn check_non_negative(path: &str, field: &str, value: f64, issues: &mut Vec<LoyaltyError>) {
    if !value.is_finite() || value < 0.0 {
        issues.push(LoyaltyError::invalid_range(
            format!("{path}.{field}"),
            format!("must be a non-negative number, got {value}"),
        ));
    }
}

pub(crate) fn check_count(path: &str, field: &str, value: f64, issues: &mut Vec<LoyaltyError>) {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        issues.push(LoyaltyError::invalid_range(
            format!("{path}.{field}"),
            format!("must be a non-negative whole number, got {value}"),
        ));
    }
}

pub(crate) fn check_positive(path: &str, field: &str, value: f64, issues: &mut Vec<LoyaltyError>) {
    if !value.is_finite() || value <= 0.0 {
        issues.push(LoyaltyError::invalid_range(
            format!("{path}.{field}"),
            format!("must be greater than zero, got {value}"),
        ));
    }
}

fn first_issue(issues: Vec<LoyaltyError>) -> Result<()> {
    match issues.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ── Base rate ───────────────────────────────────────────────────────

/// Continuous accrual: `units_earned` per `per_spend` of currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseRate {
    pub units_earned: f64,
    pub per_spend: f64,
}

impl RuleDefaults for BaseRate {
    fn defaults() -> Self {
        Self {
            units_earned: 1.0,
            per_spend: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseRatePatch {
    pub units_earned: Option<f64>,
    pub per_spend: Option<f64>,
}

impl RuleParams for BaseRate {
    type Patch = BaseRatePatch;

    fn merge(&mut self, patch: &BaseRatePatch) {
        if let Some(v) = patch.units_earned {
            self.units_earned = v;
        }
        if let Some(v) = patch.per_spend {
            self.per_spend = v;
        }
    }

    fn collect_issues(&self, path: &str, issues: &mut Vec<LoyaltyError>) {
        check_non_negative(path, "units_earned", self.units_earned, issues);
        check_positive(path, "per_spend", self.per_spend, issues);
    }
}

// ── Category multipliers ────────────────────────────────────────────

/// Upserts and removals applied to the category multiplier map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMultipliersPatch {
    pub set: IndexMap<String, f64>,
    pub remove: Vec<String>,
}

// ── Aggregate ───────────────────────────────────────────────────────

/// Complete earning description owned by a program or a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EarningRules {
    pub base_rate: BaseRate,
    /// Category → multiplier applied on top of the base rate.
    #[serde(default)]
    pub category_multipliers: IndexMap<String, f64>,
    #[serde(default)]
    pub threshold_earning: ThresholdEarning,
    #[serde(default)]
    pub behavioral_bonuses: BehavioralBonuses,
}

impl Default for EarningRules {
    /// All sub-rules present but disabled, base rate defaulted.
    fn default() -> Self {
        Self {
            base_rate: BaseRate::defaults(),
            category_multipliers: IndexMap::new(),
            threshold_earning: ThresholdEarning::default(),
            behavioral_bonuses: BehavioralBonuses::default(),
        }
    }
}

/// Partial update of [`EarningRules`]; each group merges independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningRulesPatch {
    pub base_rate: Option<BaseRatePatch>,
    pub category_multipliers: Option<CategoryMultipliersPatch>,
    pub threshold_earning: Option<ThresholdEarningPatch>,
    pub behavioral_bonuses: Option<BehavioralBonusesPatch>,
}

impl EarningRulesPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl EarningRules {
    /// Return a new rule set with `patch` merged in.
    ///
    /// Refused with `InvalidRange` if the merged result carries a negative
    /// count, a negative monetary value or a non-positive multiplier. `self`
    /// is never modified.
    pub fn apply(&self, patch: &EarningRulesPatch) -> Result<EarningRules> {
        let mut next = self.clone();

        if let Some(p) = &patch.base_rate {
            next.base_rate.merge(p);
        }
        if let Some(p) = &patch.category_multipliers {
            for category in &p.remove {
                next.category_multipliers.shift_remove(category);
            }
            for (category, multiplier) in &p.set {
                next.category_multipliers.insert(category.clone(), *multiplier);
            }
        }
        if let Some(p) = &patch.threshold_earning {
            next.threshold_earning.apply(p);
        }
        if let Some(p) = &patch.behavioral_bonuses {
            next.behavioral_bonuses.apply(p);
        }

        next.check()?;
        Ok(next)
    }

    /// First range violation, if any.
    pub fn check(&self) -> Result<()> {
        first_issue(self.issues("earning_rules"))
    }

    /// Every range violation, with paths rooted at `path`.
    pub fn issues(&self, path: &str) -> Vec<LoyaltyError> {
        let mut issues = Vec::new();
        self.base_rate
            .collect_issues(&format!("{path}.base_rate"), &mut issues);
        for (category, multiplier) in &self.category_multipliers {
            check_positive(
                &format!("{path}.category_multipliers"),
                category,
                *multiplier,
                &mut issues,
            );
        }
        self.threshold_earning
            .collect_issues(&format!("{path}.threshold_earning"), &mut issues);
        self.behavioral_bonuses
            .collect_issues(&format!("{path}.behavioral_bonuses"), &mut issues);
        issues
    }

    /// True when at least one category multiplier is set.
    pub fn has_category_multipliers(&self) -> bool {
        !self.category_multipliers.is_empty()
    }
}
