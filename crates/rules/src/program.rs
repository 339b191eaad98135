//! Value program: the accrual currency, its variant-specific configuration,
//! and where earning rules live (program-wide or per tier).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use loyalty_core::{LoyaltyError, ObjectKind, Result, TierId};

use crate::earning::{check_non_negative, check_positive, EarningRules, EarningRulesPatch};
use crate::tier::{NewTier, Tier, TierPatch};

// ── Value type ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Points,
    Cashback,
    Credits,
    Vouchers,
    Hybrid,
}

/// How value accrues for a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarningMode {
    /// Per-unit accrual: base rate and category multipliers apply.
    Continuous,
    /// Rewards issued when a threshold is crossed.
    ThresholdBased,
    /// Two currencies side by side or converted into one another.
    Mixed,
}

impl ValueType {
    pub fn earning_mode(self) -> EarningMode {
        match self {
            ValueType::Points | ValueType::Cashback => EarningMode::Continuous,
            ValueType::Credits | ValueType::Vouchers => EarningMode::ThresholdBased,
            ValueType::Hybrid => EarningMode::Mixed,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Points => write!(f, "points"),
            ValueType::Cashback => write!(f, "cashback"),
            ValueType::Credits => write!(f, "credits"),
            ValueType::Vouchers => write!(f, "vouchers"),
            ValueType::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Single currencies a hybrid program can combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Points,
    Cashback,
    Credits,
    Vouchers,
}

// ── Hybrid strategies ───────────────────────────────────────────────

/// Earn two currencies at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DualEarning {
    pub primary_type: Currency,
    pub primary_rate: f64,
    pub secondary_type: Currency,
    pub secondary_rate: f64,
}

impl Default for DualEarning {
    fn default() -> Self {
        Self {
            primary_type: Currency::Points,
            primary_rate: 1.0,
            secondary_type: Currency::Cashback,
            secondary_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DualEarningPatch {
    pub primary_type: Option<Currency>,
    pub primary_rate: Option<f64>,
    pub secondary_type: Option<Currency>,
    pub secondary_rate: Option<f64>,
}

/// Convert `from_amount` of one currency into `to_amount` of another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionRule {
    pub from_type: Currency,
    pub from_amount: f64,
    pub to_type: Currency,
    pub to_amount: f64,
    pub auto_convert: bool,
}

impl Default for ConversionRule {
    fn default() -> Self {
        Self {
            from_type: Currency::Points,
            from_amount: 100.0,
            to_type: Currency::Cashback,
            to_amount: 1.0,
            auto_convert: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionPatch {
    pub from_type: Option<Currency>,
    pub from_amount: Option<f64>,
    pub to_type: Option<Currency>,
    pub to_amount: Option<f64>,
    pub auto_convert: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridStrategyKind {
    Dual,
    Conversion,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum HybridStrategy {
    Dual { dual: DualEarning },
    Conversion { conversion: ConversionRule },
    Both { dual: DualEarning, conversion: ConversionRule },
}

impl HybridStrategy {
    pub fn kind(&self) -> HybridStrategyKind {
        match self {
            HybridStrategy::Dual { .. } => HybridStrategyKind::Dual,
            HybridStrategy::Conversion { .. } => HybridStrategyKind::Conversion,
            HybridStrategy::Both { .. } => HybridStrategyKind::Both,
        }
    }

    pub fn dual(&self) -> Option<&DualEarning> {
        match self {
            HybridStrategy::Dual { dual } | HybridStrategy::Both { dual, .. } => Some(dual),
            HybridStrategy::Conversion { .. } => None,
        }
    }

    pub fn conversion(&self) -> Option<&ConversionRule> {
        match self {
            HybridStrategy::Conversion { conversion } | HybridStrategy::Both { conversion, .. } => {
                Some(conversion)
            }
            HybridStrategy::Dual { .. } => None,
        }
    }

    /// Switch strategy, carrying over blocks the new shape still has.
    fn switch_to(self, kind: HybridStrategyKind) -> HybridStrategy {
        let dual = self.dual().copied().unwrap_or_default();
        let conversion = self.conversion().copied().unwrap_or_default();
        match kind {
            HybridStrategyKind::Dual => HybridStrategy::Dual { dual },
            HybridStrategyKind::Conversion => HybridStrategy::Conversion { conversion },
            HybridStrategyKind::Both => HybridStrategy::Both { dual, conversion },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridPatch {
    pub strategy: Option<HybridStrategyKind>,
    /// Applied only when the resulting strategy has a dual block.
    pub dual: Option<DualEarningPatch>,
    /// Applied only when the resulting strategy has a conversion block.
    pub conversion: Option<ConversionPatch>,
}

// ── Value config ────────────────────────────────────────────────────

/// Variant-specific configuration keyed by value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "value_type", rename_all = "snake_case")]
pub enum ValueConfig {
    Points {
        points_name: String,
        /// Currency value of a single point.
        point_value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiration_months: Option<u32>,
    },
    Cashback {
        percentage: f64,
        minimum_redemption: f64,
    },
    Credits {
        credit_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiration_months: Option<u32>,
    },
    Vouchers {
        default_value: f64,
        validity_days: u32,
    },
    Hybrid(HybridStrategy),
}

impl ValueConfig {
    /// Default configuration shape for `value_type`.
    pub fn default_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Points => ValueConfig::Points {
                points_name: "Points".to_string(),
                point_value: 0.01,
                expiration_months: Some(12),
            },
            ValueType::Cashback => ValueConfig::Cashback {
                percentage: 2.0,
                minimum_redemption: 10.0,
            },
            ValueType::Credits => ValueConfig::Credits {
                credit_name: "Store Credit".to_string(),
                expiration_months: None,
            },
            ValueType::Vouchers => ValueConfig::Vouchers {
                default_value: 10.0,
                validity_days: 30,
            },
            ValueType::Hybrid => ValueConfig::Hybrid(HybridStrategy::Dual {
                dual: DualEarning::default(),
            }),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ValueConfig::Points { .. } => ValueType::Points,
            ValueConfig::Cashback { .. } => ValueType::Cashback,
            ValueConfig::Credits { .. } => ValueType::Credits,
            ValueConfig::Vouchers { .. } => ValueType::Vouchers,
            ValueConfig::Hybrid(_) => ValueType::Hybrid,
        }
    }

    pub fn hybrid(&self) -> Option<&HybridStrategy> {
        match self {
            ValueConfig::Hybrid(strategy) => Some(strategy),
            _ => None,
        }
    }

    /// Return a copy with `patch` merged in.
    ///
    /// Fails with `VariantMismatch` when the patch targets another value type.
    pub fn merged(&self, patch: &ValueConfigPatch) -> Result<ValueConfig> {
        let mut next = self.clone();
        match (&mut next, patch) {
            (
                ValueConfig::Points {
                    points_name,
                    point_value,
                    expiration_months,
                },
                ValueConfigPatch::Points(p),
            ) => {
                if let Some(v) = &p.points_name {
                    *points_name = v.clone();
                }
                if let Some(v) = p.point_value {
                    *point_value = v;
                }
                if let Some(v) = p.expiration_months {
                    *expiration_months = (v > 0).then_some(v);
                }
            }
            (
                ValueConfig::Cashback {
                    percentage,
                    minimum_redemption,
                },
                ValueConfigPatch::Cashback(p),
            ) => {
                if let Some(v) = p.percentage {
                    *percentage = v;
                }
                if let Some(v) = p.minimum_redemption {
                    *minimum_redemption = v;
                }
            }
            (
                ValueConfig::Credits {
                    credit_name,
                    expiration_months,
                },
                ValueConfigPatch::Credits(p),
            ) => {
                if let Some(v) = &p.credit_name {
                    *credit_name = v.clone();
                }
                if let Some(v) = p.expiration_months {
                    *expiration_months = (v > 0).then_some(v);
                }
            }
            (
                ValueConfig::Vouchers {
                    default_value,
                    validity_days,
                },
                ValueConfigPatch::Vouchers(p),
            ) => {
                if let Some(v) = p.default_value {
                    *default_value = v;
                }
                if let Some(v) = p.validity_days {
                    *validity_days = v;
                }
            }
            (ValueConfig::Hybrid(strategy), ValueConfigPatch::Hybrid(p)) => {
                if let Some(kind) = p.strategy {
                    *strategy = strategy.switch_to(kind);
                }
                merge_hybrid_blocks(strategy, p);
            }
            (current, patch) => {
                return Err(LoyaltyError::VariantMismatch {
                    expected: current.value_type().to_string(),
                    found: patch.value_type().to_string(),
                });
            }
        }
        if let Some(err) = next.issues("value_config").into_iter().next() {
            return Err(err);
        }
        Ok(next)
    }

    /// Every range violation, with paths rooted at `path`.
    pub fn issues(&self, path: &str) -> Vec<LoyaltyError> {
        let mut issues = Vec::new();
        match self {
            ValueConfig::Points {
                points_name,
                point_value,
                ..
            } => {
                if points_name.trim().is_empty() {
                    issues.push(LoyaltyError::invalid_range(
                        format!("{path}.points_name"),
                        "must not be empty",
                    ));
                }
                check_positive(path, "point_value", *point_value, &mut issues);
            }
            ValueConfig::Cashback {
                percentage,
                minimum_redemption,
            } => {
                if !(*percentage > 0.0 && *percentage <= 100.0) {
                    issues.push(LoyaltyError::invalid_range(
                        format!("{path}.percentage"),
                        format!("must be within (0, 100], got {percentage}"),
                    ));
                }
                check_non_negative(path, "minimum_redemption", *minimum_redemption, &mut issues);
            }
            ValueConfig::Credits { credit_name, .. } => {
                if credit_name.trim().is_empty() {
                    issues.push(LoyaltyError::invalid_range(
                        format!("{path}.credit_name"),
                        "must not be empty",
                    ));
                }
            }
            ValueConfig::Vouchers {
                default_value,
                validity_days,
            } => {
                check_non_negative(path, "default_value", *default_value, &mut issues);
                if *validity_days == 0 {
                    issues.push(LoyaltyError::invalid_range(
                        format!("{path}.validity_days"),
                        "must be at least one day",
                    ));
                }
            }
            ValueConfig::Hybrid(strategy) => {
                if let Some(dual) = strategy.dual() {
                    let p = format!("{path}.dual");
                    check_positive(&p, "primary_rate", dual.primary_rate, &mut issues);
                    check_positive(&p, "secondary_rate", dual.secondary_rate, &mut issues);
                    if dual.primary_type == dual.secondary_type {
                        issues.push(LoyaltyError::invalid_range(
                            format!("{p}.secondary_type"),
                            "must differ from primary_type",
                        ));
                    }
                }
                if let Some(conversion) = strategy.conversion() {
                    let p = format!("{path}.conversion");
                    check_positive(&p, "from_amount", conversion.from_amount, &mut issues);
                    check_positive(&p, "to_amount", conversion.to_amount, &mut issues);
                    if conversion.from_type == conversion.to_type {
                        issues.push(LoyaltyError::invalid_range(
                            format!("{p}.to_type"),
                            "must differ from from_type",
                        ));
                    }
                }
            }
        }
        issues
    }
}

fn merge_hybrid_blocks(strategy: &mut HybridStrategy, patch: &HybridPatch) {
    let (dual, conversion) = match strategy {
        HybridStrategy::Dual { dual } => (Some(dual), None),
        HybridStrategy::Conversion { conversion } => (None, Some(conversion)),
        HybridStrategy::Both { dual, conversion } => (Some(dual), Some(conversion)),
    };
    if dual.is_none() && patch.dual.is_some() {
        debug!(strategy = ?patch.strategy, "ignoring dual fields for a strategy without a dual block");
    }
    if conversion.is_none() && patch.conversion.is_some() {
        debug!(strategy = ?patch.strategy, "ignoring conversion fields for a strategy without a conversion block");
    }
    if let (Some(dual), Some(p)) = (dual, &patch.dual) {
        if let Some(v) = p.primary_type {
            dual.primary_type = v;
        }
        if let Some(v) = p.primary_rate {
            dual.primary_rate = v;
        }
        if let Some(v) = p.secondary_type {
            dual.secondary_type = v;
        }
        if let Some(v) = p.secondary_rate {
            dual.secondary_rate = v;
        }
    }
    if let (Some(conversion), Some(p)) = (conversion, &patch.conversion) {
        if let Some(v) = p.from_type {
            conversion.from_type = v;
        }
        if let Some(v) = p.from_amount {
            conversion.from_amount = v;
        }
        if let Some(v) = p.to_type {
            conversion.to_type = v;
        }
        if let Some(v) = p.to_amount {
            conversion.to_amount = v;
        }
        if let Some(v) = p.auto_convert {
            conversion.auto_convert = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsPatch {
    pub points_name: Option<String>,
    pub point_value: Option<f64>,
    /// `0` clears the expiration.
    pub expiration_months: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashbackPatch {
    pub percentage: Option<f64>,
    pub minimum_redemption: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditsPatch {
    pub credit_name: Option<String>,
    /// `0` clears the expiration.
    pub expiration_months: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VouchersPatch {
    pub default_value: Option<f64>,
    pub validity_days: Option<u32>,
}

/// Partial update of the value config; the variant must match the program's value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "value_type", rename_all = "snake_case")]
pub enum ValueConfigPatch {
    Points(PointsPatch),
    Cashback(CashbackPatch),
    Credits(CreditsPatch),
    Vouchers(VouchersPatch),
    Hybrid(HybridPatch),
}

impl ValueConfigPatch {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueConfigPatch::Points(_) => ValueType::Points,
            ValueConfigPatch::Cashback(_) => ValueType::Cashback,
            ValueConfigPatch::Credits(_) => ValueType::Credits,
            ValueConfigPatch::Vouchers(_) => ValueType::Vouchers,
            ValueConfigPatch::Hybrid(_) => ValueType::Hybrid,
        }
    }
}

// ── Program ─────────────────────────────────────────────────────────

/// Earning rules currently in effect.
#[derive(Debug, Clone, Copy)]
pub enum ActiveEarning<'a> {
    ProgramWide(&'a EarningRules),
    Tiered(&'a [Tier]),
}

/// Top-level value program aggregate.
///
/// `use_tiers` selects whether `tiers` or `program_earning_rules` is
/// authoritative. The inactive side is retained so toggling never loses data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueProgram {
    value_config: ValueConfig,
    #[serde(default)]
    use_tiers: bool,
    #[serde(default)]
    tiers: Vec<Tier>,
    #[serde(default)]
    program_earning_rules: EarningRules,
}

impl Default for ValueProgram {
    fn default() -> Self {
        Self::new(ValueType::Points)
    }
}

impl ValueProgram {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_config: ValueConfig::default_for(value_type),
            use_tiers: false,
            tiers: Vec::new(),
            program_earning_rules: EarningRules::default(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.value_config.value_type()
    }

    pub fn value_config(&self) -> &ValueConfig {
        &self.value_config
    }

    pub fn use_tiers(&self) -> bool {
        self.use_tiers
    }

    /// Tiers in insertion order.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn tier(&self, id: TierId) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Tiers sorted by ascending threshold for display.
    pub fn tiers_by_threshold(&self) -> Vec<&Tier> {
        let mut sorted: Vec<&Tier> = self.tiers.iter().collect();
        sorted.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        sorted
    }

    pub fn program_earning_rules(&self) -> &EarningRules {
        &self.program_earning_rules
    }

    pub fn active_earning(&self) -> ActiveEarning<'_> {
        if self.use_tiers {
            ActiveEarning::Tiered(&self.tiers)
        } else {
            ActiveEarning::ProgramWide(&self.program_earning_rules)
        }
    }

    /// Flip the tiering selector. Neither tiers nor program rules are touched.
    pub fn set_use_tiers(&mut self, use_tiers: bool) {
        debug!(use_tiers, "tiering mode set");
        self.use_tiers = use_tiers;
    }

    /// Switch the value type, resetting its configuration to the new type's
    /// default shape. Selecting the current type again changes nothing.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        if self.value_type() == value_type {
            return;
        }
        info!(from = %self.value_type(), to = %value_type, "value type switched");
        self.value_config = ValueConfig::default_for(value_type);
    }

    pub fn update_value_config(&mut self, patch: &ValueConfigPatch) -> Result<()> {
        self.value_config = self.value_config.merged(patch)?;
        Ok(())
    }

    pub fn update_program_earning(&mut self, patch: &EarningRulesPatch) -> Result<()> {
        self.program_earning_rules = self.program_earning_rules.apply(patch)?;
        Ok(())
    }

    /// Add a tier with default earning rules.
    ///
    /// Tier names are unique ignoring case and surrounding whitespace.
    pub fn add_tier(&mut self, new: NewTier) -> Result<&Tier> {
        self.ensure_unique_name(&new.name, None)?;
        let tier = Tier::create(new)?;
        info!(tier_id = %tier.id, name = %tier.name, "added tier");
        self.tiers.push(tier);
        let last = self.tiers.len() - 1;
        Ok(&self.tiers[last])
    }

    pub fn update_tier(&mut self, id: TierId, patch: &TierPatch) -> Result<&Tier> {
        let index = self.tier_index(id)?;
        let next = self.tiers[index].merged(patch)?;
        if patch.name.is_some() {
            self.ensure_unique_name(&next.name, Some(id))?;
        }
        self.tiers[index] = next;
        debug!(tier_id = %id, "updated tier");
        Ok(&self.tiers[index])
    }

    /// Remove a tier; unknown ids are reported as `NotFound`.
    pub fn remove_tier(&mut self, id: TierId) -> Result<Tier> {
        let index = self.tier_index(id)?;
        let tier = self.tiers.remove(index);
        info!(tier_id = %id, name = %tier.name, "removed tier");
        Ok(tier)
    }

    fn tier_index(&self, id: TierId) -> Result<usize> {
        self.tiers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Tier, id))
    }

    fn ensure_unique_name(&self, name: &str, except: Option<TierId>) -> Result<()> {
        let key = Tier::name_key(name);
        let taken = self
            .tiers
            .iter()
            .any(|t| Some(t.id) != except && Tier::name_key(&t.name) == key);
        if taken {
            return Err(LoyaltyError::DuplicateName {
                kind: ObjectKind::Tier,
                name: name.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::TierColor;

    fn tiered_program() -> ValueProgram {
        let mut program = ValueProgram::new(ValueType::Points);
        program.add_tier(NewTier::new("Gold", 1000.0, TierColor::Gold)).unwrap();
        program.add_tier(NewTier::new("Bronze", 0.0, TierColor::Bronze)).unwrap();
        program.add_tier(NewTier::new("Silver", 500.0, TierColor::Silver)).unwrap();
        program
    }

    #[test]
    fn toggling_use_tiers_is_reversible() {
        let mut program = tiered_program();
        let before = program.tiers().to_vec();
        program.set_use_tiers(true);
        program.set_use_tiers(false);
        program.set_use_tiers(true);
        assert_eq!(program.tiers(), before.as_slice());
        assert!(matches!(program.active_earning(), ActiveEarning::Tiered(t) if t.len() == 3));
    }

    #[test]
    fn program_rules_survive_tier_mode() {
        let mut program = ValueProgram::new(ValueType::Points);
        program
            .update_program_earning(&EarningRulesPatch {
                base_rate: Some(crate::earning::BaseRatePatch {
                    units_earned: Some(5.0),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();
        program.set_use_tiers(true);
        program.set_use_tiers(false);
        match program.active_earning() {
            ActiveEarning::ProgramWide(rules) => assert_eq!(rules.base_rate.units_earned, 5.0),
            ActiveEarning::Tiered(_) => panic!("expected program-wide rules"),
        }
    }

    #[test]
    fn switching_hybrid_to_points_drops_hybrid_fields() {
        let mut program = ValueProgram::new(ValueType::Points);
        program.set_value_type(ValueType::Hybrid);
        assert!(program.value_config().hybrid().is_some());
        program.set_value_type(ValueType::Points);
        assert!(program.value_config().hybrid().is_none());
        let json = serde_json::to_value(program.value_config()).unwrap();
        assert!(json.get("dual").is_none());
        assert!(json.get("strategy").is_none());
        assert_eq!(json["value_type"], "points");
    }

    #[test]
    fn setting_same_value_type_keeps_config() {
        let mut program = ValueProgram::new(ValueType::Cashback);
        program
            .update_value_config(&ValueConfigPatch::Cashback(CashbackPatch {
                percentage: Some(5.0),
                ..Default::default()
            }))
            .unwrap();
        program.set_value_type(ValueType::Cashback);
        assert!(matches!(
            program.value_config(),
            ValueConfig::Cashback { percentage, .. } if *percentage == 5.0
        ));
    }

    #[test]
    fn mismatched_config_patch_is_refused() {
        let mut program = ValueProgram::new(ValueType::Points);
        let err = program
            .update_value_config(&ValueConfigPatch::Vouchers(VouchersPatch::default()))
            .unwrap_err();
        assert_eq!(
            err,
            LoyaltyError::VariantMismatch {
                expected: "points".to_string(),
                found: "vouchers".to_string()
            }
        );
    }

    #[test]
    fn hybrid_both_populates_missing_block() {
        let mut program = ValueProgram::new(ValueType::Hybrid);
        program
            .update_value_config(&ValueConfigPatch::Hybrid(HybridPatch {
                dual: Some(DualEarningPatch {
                    primary_rate: Some(2.0),
                    ..Default::default()
                }),
                ..Default::default()
            }))
            .unwrap();
        program
            .update_value_config(&ValueConfigPatch::Hybrid(HybridPatch {
                strategy: Some(HybridStrategyKind::Both),
                conversion: Some(ConversionPatch {
                    auto_convert: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            }))
            .unwrap();
        let strategy = program.value_config().hybrid().unwrap();
        assert_eq!(strategy.kind(), HybridStrategyKind::Both);
        assert_eq!(strategy.dual().unwrap().primary_rate, 2.0);
        assert!(strategy.conversion().unwrap().auto_convert);
    }

    #[test]
    fn patch_for_inactive_hybrid_block_is_ignored() {
        let mut program = ValueProgram::new(ValueType::Hybrid);
        let before = program.clone();
        program
            .update_value_config(&ValueConfigPatch::Hybrid(HybridPatch {
                conversion: Some(ConversionPatch {
                    from_amount: Some(500.0),
                    ..Default::default()
                }),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(program, before);
        assert!(program.value_config().hybrid().unwrap().conversion().is_none());
    }

    #[test]
    fn hybrid_same_currency_conversion_is_refused() {
        let mut program = ValueProgram::new(ValueType::Hybrid);
        let before = program.clone();
        let err = program
            .update_value_config(&ValueConfigPatch::Hybrid(HybridPatch {
                strategy: Some(HybridStrategyKind::Conversion),
                conversion: Some(ConversionPatch {
                    to_type: Some(Currency::Points),
                    ..Default::default()
                }),
                ..Default::default()
            }))
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::InvalidRange { .. }));
        assert_eq!(program, before);
    }

    #[test]
    fn duplicate_tier_name_is_refused() {
        let mut program = tiered_program();
        let err = program
            .add_tier(NewTier::new(" gold", 2000.0, TierColor::Platinum))
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::DuplicateName { .. }));
        assert_eq!(program.tiers().len(), 3);
    }

    #[test]
    fn renaming_tier_onto_sibling_is_refused() {
        let mut program = tiered_program();
        let silver = program.tiers()[2].id;
        let err = program
            .update_tier(
                silver,
                &TierPatch {
                    name: Some("Bronze".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::DuplicateName { .. }));
        assert_eq!(program.tier(silver).unwrap().name, "Silver");
    }

    #[test]
    fn renaming_tier_to_own_name_in_other_case_is_allowed() {
        let mut program = tiered_program();
        let silver = program.tiers()[2].id;
        let tier = program
            .update_tier(
                silver,
                &TierPatch {
                    name: Some("SILVER".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(tier.name, "SILVER");
    }

    #[test]
    fn removing_unknown_tier_is_not_found() {
        let mut program = tiered_program();
        let err = program.remove_tier(TierId::new()).unwrap_err();
        assert!(matches!(err, LoyaltyError::NotFound { kind: ObjectKind::Tier, .. }));
        assert_eq!(program.tiers().len(), 3);
    }

    #[test]
    fn remove_tier_returns_removed_tier() {
        let mut program = tiered_program();
        let gold = program.tiers()[0].id;
        let removed = program.remove_tier(gold).unwrap();
        assert_eq!(removed.name, "Gold");
        assert!(program.tier(gold).is_none());
    }

    #[test]
    fn tiers_display_by_ascending_threshold() {
        let program = tiered_program();
        let names: Vec<&str> = program
            .tiers_by_threshold()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bronze", "Silver", "Gold"]);
    }

    #[test]
    fn value_config_yaml_uses_explicit_discriminators() {
        let config = ValueConfig::Hybrid(HybridStrategy::Both {
            dual: DualEarning::default(),
            conversion: ConversionRule::default(),
        });
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("value_type: hybrid"));
        assert!(yaml.contains("strategy: both"));
        let parsed: ValueConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn earning_modes_follow_value_type() {
        assert_eq!(ValueType::Cashback.earning_mode(), EarningMode::Continuous);
        assert_eq!(ValueType::Vouchers.earning_mode(), EarningMode::ThresholdBased);
        assert_eq!(ValueType::Hybrid.earning_mode(), EarningMode::Mixed);
    }
}
