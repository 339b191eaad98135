//! Value program checks: value config ranges, tier set consistency, earning
//! rule ranges and settings that have no effect for the value type.

use std::collections::HashMap;

use crate::earning::EarningRules;
use crate::program::{EarningMode, ValueProgram};
use crate::tier::Tier;

use super::{join, ValidationResult};

pub(super) fn validate_program(program: &ValueProgram, root: &str, result: &mut ValidationResult) {
    let config_path = join(root, "value_config");
    for err in program.value_config().issues(&config_path) {
        result.issue(&config_path, err);
    }

    validate_tiers(program, root, result);

    let program_path = join(root, "program_earning_rules");
    for err in program.program_earning_rules().issues(&program_path) {
        result.issue(&program_path, err);
    }

    // Only the authoritative rule set is checked against the value type.
    let mode = program.value_type().earning_mode();
    if program.use_tiers() {
        for (i, tier) in program.tiers().iter().enumerate() {
            let path = join(root, &format!("tiers[{i}].earning_rules"));
            check_mode_fit(&tier.earning_rules, mode, &path, result);
        }
    } else {
        check_mode_fit(program.program_earning_rules(), mode, &program_path, result);
    }
}

fn validate_tiers(program: &ValueProgram, root: &str, result: &mut ValidationResult) {
    let tiers_path = join(root, "tiers");
    if program.use_tiers() && program.tiers().is_empty() {
        result.error(
            &tiers_path,
            "use_tiers is set but no tiers are defined; add a tier or switch to program-wide rules",
        );
    }

    let mut names: HashMap<String, usize> = HashMap::new();
    let mut thresholds: Vec<(f64, usize)> = Vec::new();
    for (i, tier) in program.tiers().iter().enumerate() {
        let path = format!("{tiers_path}[{i}]");
        for err in tier.issues(&path) {
            result.issue(&path, err);
        }

        if let Some(first) = names.insert(Tier::name_key(&tier.name), i) {
            result.error(
                format!("{path}.name"),
                format!("tier name '{}' is already used by tiers[{first}]", tier.name),
            );
        }
        if let Some(&(_, first)) = thresholds.iter().find(|(t, _)| *t == tier.threshold) {
            result.warn(
                format!("{path}.threshold"),
                format!(
                    "threshold {} is shared with tiers[{first}]; members qualify for both",
                    tier.threshold
                ),
            );
        }
        thresholds.push((tier.threshold, i));
    }
}

fn check_mode_fit(rules: &EarningRules, mode: EarningMode, path: &str, result: &mut ValidationResult) {
    match mode {
        EarningMode::Continuous => {
            if rules.threshold_earning.any_enabled() {
                result.warn(
                    format!("{path}.threshold_earning"),
                    "threshold earning has no effect for continuous value types (points, cashback)",
                );
            }
        }
        EarningMode::ThresholdBased => {
            if rules.has_category_multipliers() {
                result.warn(
                    format!("{path}.category_multipliers"),
                    "category multipliers have no effect for threshold-based value types (credits, vouchers)",
                );
            }
        }
        EarningMode::Mixed => {}
    }
}
