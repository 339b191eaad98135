//! Tiers: named customer segments with their own earning-rule overrides.

use serde::{Deserialize, Serialize};

use loyalty_core::{LoyaltyError, Result, TierId};

use crate::earning::{check_non_negative, EarningRules, EarningRulesPatch};

/// Display color of a tier badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierColor {
    Slate,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Sapphire,
    Ruby,
}

impl TierColor {
    pub const ALL: [TierColor; 8] = [
        TierColor::Slate,
        TierColor::Bronze,
        TierColor::Silver,
        TierColor::Gold,
        TierColor::Platinum,
        TierColor::Emerald,
        TierColor::Sapphire,
        TierColor::Ruby,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tier {
    pub id: TierId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Qualification threshold; tiers are displayed in ascending order of it.
    pub threshold: f64,
    pub color: TierColor,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub earning_rules: EarningRules,
}

/// Input for creating a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTier {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub threshold: f64,
    pub color: TierColor,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl NewTier {
    pub fn new(name: impl Into<String>, threshold: f64, color: TierColor) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            threshold,
            color,
            benefits: Vec::new(),
        }
    }

    pub fn with_benefits<I, S>(mut self, benefits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.benefits = benefits.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub threshold: Option<f64>,
    pub color: Option<TierColor>,
    /// Replaces the whole ordered list.
    pub benefits: Option<Vec<String>>,
    pub earning_rules: Option<EarningRulesPatch>,
}

impl Tier {
    /// Build a tier with a fresh id and default earning rules.
    pub fn create(new: NewTier) -> Result<Tier> {
        let tier = Tier {
            id: TierId::new(),
            name: new.name.trim().to_string(),
            description: new.description,
            threshold: new.threshold,
            color: new.color,
            benefits: new.benefits,
            earning_rules: EarningRules::default(),
        };
        tier.check_fields()?;
        Ok(tier)
    }

    /// Return a copy with `patch` merged in; the id never changes.
    pub fn merged(&self, patch: &TierPatch) -> Result<Tier> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        if let Some(threshold) = patch.threshold {
            next.threshold = threshold;
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        if let Some(benefits) = &patch.benefits {
            next.benefits = benefits.clone();
        }
        if let Some(rules) = &patch.earning_rules {
            next.earning_rules = next.earning_rules.apply(rules)?;
        }
        next.check_fields()?;
        Ok(next)
    }

    fn check_fields(&self) -> Result<()> {
        match self.field_issues("tier").into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn field_issues(&self, path: &str) -> Vec<LoyaltyError> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(LoyaltyError::invalid_range(
                format!("{path}.name"),
                "must not be empty",
            ));
        }
        check_non_negative(path, "threshold", self.threshold, &mut issues);
        issues
    }

    /// Every range violation of the tier and its earning rules.
    pub fn issues(&self, path: &str) -> Vec<LoyaltyError> {
        let mut issues = self.field_issues(path);
        issues.extend(self.earning_rules.issues(&format!("{path}.earning_rules")));
        issues
    }

    pub(crate) fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earning::{BehavioralBonusesPatch, SubRulePatch};

    #[test]
    fn create_trims_name_and_defaults_rules() {
        let tier = Tier::create(NewTier::new("  Gold ", 1000.0, TierColor::Gold)).unwrap();
        assert_eq!(tier.name, "Gold");
        assert_eq!(tier.earning_rules, EarningRules::default());
    }

    #[test]
    fn negative_threshold_is_refused() {
        let err = Tier::create(NewTier::new("Gold", -1.0, TierColor::Gold)).unwrap_err();
        assert!(matches!(err, LoyaltyError::InvalidRange { .. }));
    }

    #[test]
    fn merge_keeps_id_and_untouched_fields() {
        let tier = Tier::create(
            NewTier::new("Silver", 500.0, TierColor::Silver).with_benefits(["Free coffee"]),
        )
        .unwrap();
        let merged = tier
            .merged(&TierPatch {
                threshold: Some(750.0),
                earning_rules: Some(EarningRulesPatch {
                    behavioral_bonuses: Some(BehavioralBonusesPatch {
                        first_purchase: Some(SubRulePatch::enable()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.id, tier.id);
        assert_eq!(merged.threshold, 750.0);
        assert_eq!(merged.benefits, vec!["Free coffee".to_string()]);
        assert!(merged.earning_rules.behavioral_bonuses.first_purchase.enabled);
    }

    #[test]
    fn blank_rename_is_refused() {
        let tier = Tier::create(NewTier::new("Silver", 500.0, TierColor::Silver)).unwrap();
        let err = tier
            .merged(&TierPatch {
                name: Some("   ".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::InvalidRange { .. }));
    }
}
