//! Queue and signal template checks.

use std::collections::HashMap;

use loyalty_core::{LoyaltyError, SignalId};

use crate::queue::QueueSet;
use crate::signal::{SignalDraft, SignalTemplate, KNOWN_ACTIONS};

use super::fuzzy::fuzzy_match;
use super::ValidationResult;

pub(super) fn validate_queues(queues: &QueueSet, root: &str, result: &mut ValidationResult) {
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut signal_ids: HashMap<SignalId, String> = HashMap::new();

    for (i, queue) in queues.queues().iter().enumerate() {
        let path = format!("{root}[{i}]");

        if queue.name.trim().is_empty() {
            result.error(format!("{path}.name"), "queue name must not be empty");
        } else if let Some(first) = names.insert(queue.name.trim().to_lowercase(), i) {
            result.warn(
                format!("{path}.name"),
                format!("queue name '{}' is also used by {root}[{first}]", queue.name),
            );
        }

        if queue.enabled && queue.signals().is_empty() {
            result.warn(&path, "queue is enabled but has no signals");
        }

        for (j, signal) in queue.signals().iter().enumerate() {
            let signal_path = format!("{path}.signals[{j}]");
            if let Some(first) = signal_ids.insert(signal.id(), signal_path.clone()) {
                result.error(
                    format!("{signal_path}.id"),
                    format!("signal id {} is already used at {first}", signal.id()),
                );
            }
            validate_signal(signal, &signal_path, result);
        }
    }
}

fn validate_signal(signal: &SignalTemplate, path: &str, result: &mut ValidationResult) {
    // Same rules as a builder save; the draft round trip reports the first
    // violation with its field name.
    match SignalDraft::from(signal).materialize() {
        Ok(_) => {}
        Err(LoyaltyError::IncompleteTemplate { missing }) => {
            for field in missing {
                result.error(format!("{path}.{field}"), format!("'{field}' is required"));
            }
        }
        Err(LoyaltyError::InvalidRange { field, reason }) => {
            result.error(format!("{path}.{field}"), reason);
        }
        Err(other) => result.error(path, other.to_string()),
    }

    for action in &signal.actions {
        if !KNOWN_ACTIONS.contains(&action.as_str()) {
            let suggestion = fuzzy_match(action, KNOWN_ACTIONS).map(|s| format!("did you mean '{s}'?"));
            result.warn_with_suggestion(
                format!("{path}.actions"),
                format!("unknown action '{action}'"),
                suggestion,
            );
        }
    }

    if signal.cooldown_hours == 0.0 {
        result.warn(
            format!("{path}.cooldown_hours"),
            "cooldown of 0 hours re-fires on every evaluation",
        );
    }

    let natural = signal.metric.natural_unit();
    if signal.unit != natural {
        result.warn(
            format!("{path}.unit"),
            format!(
                "{:?} is usually measured as {:?}, got {:?}",
                signal.metric, natural, signal.unit
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::signal::{AnalysisOperator, ConditionKind, Metric, Priority, SignalPatch, Unit};
    use crate::validation::validate_queues;

    use super::*;

    fn template(patch: SignalPatch) -> SignalTemplate {
        let mut draft = SignalDraft::new();
        draft.apply(&SignalPatch {
            name: Some("Churn risk".to_string()),
            metric: Some(Metric::InactiveMembers),
            operator: Some(AnalysisOperator::Trend),
            condition: Some(ConditionKind::GreaterThan),
            threshold: Some(200.0),
            unit: Some(Unit::Count),
            priority: Some(Priority::Medium),
            actions: Some(["send_offer".to_string()].into_iter().collect()),
            ..Default::default()
        });
        draft.apply(&patch);
        draft.materialize().unwrap()
    }

    #[test]
    fn clean_queue_has_no_findings() {
        let mut queues = QueueSet::new();
        let churn = queues.add_queue("Churn", "");
        queues.add_signal(churn, template(SignalPatch::default())).unwrap();
        let result = validate_queues(&queues);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn unknown_action_gets_a_suggestion() {
        let mut queues = QueueSet::new();
        let churn = queues.add_queue("Churn", "");
        queues
            .add_signal(
                churn,
                template(SignalPatch {
                    actions: Some(["sned_offer".to_string()].into_iter().collect()),
                    ..Default::default()
                }),
            )
            .unwrap();
        let result = validate_queues(&queues);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "queues[0].signals[0].actions");
        assert_eq!(
            result.warnings[0].suggestion.as_deref(),
            Some("did you mean 'send_offer'?")
        );
    }

    #[test]
    fn zero_cooldown_and_unit_mismatch_are_warnings() {
        let mut queues = QueueSet::new();
        let churn = queues.add_queue("Churn", "");
        queues
            .add_signal(
                churn,
                template(SignalPatch {
                    cooldown_hours: Some(0.0),
                    unit: Some(Unit::Percentage),
                    ..Default::default()
                }),
            )
            .unwrap();
        let result = validate_queues(&queues);
        assert!(result.valid);
        let paths: Vec<&str> = result.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["queues[0].signals[0].cooldown_hours", "queues[0].signals[0].unit"]
        );
    }

    #[test]
    fn duplicate_queue_names_warn_and_duplicate_signal_ids_fail() {
        let mut queues = QueueSet::new();
        let a = queues.add_queue("Churn", "");
        let b = queues.add_queue("churn", "");
        queues.add_signal(a, template(SignalPatch::default())).unwrap();
        assert!(queues.queue(b).unwrap().signals().is_empty());

        // Only a hand-edited document can carry the same id in two queues.
        let mut raw = serde_json::to_value(&queues).unwrap();
        raw[1]["signals"] = raw[0]["signals"].clone();
        let queues: QueueSet = serde_json::from_value(raw).unwrap();

        let result = validate_queues(&queues);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "queues[1].signals[0].id");
        assert!(result.warnings.iter().any(|w| w.path == "queues[1].name"));
    }

    #[test]
    fn invalid_between_range_from_a_document_is_an_error() {
        let yaml = r#"
- id: 0b6c7c56-2f0e-4d7b-8f5e-0c7c3f1f4b2a
  name: Fraud
  signals:
    - id: 9a0d2f44-1b7e-4a4c-9c1d-2e5f6a7b8c9d
      name: Returns
      metric: return_rate
      operator: threshold_breach
      period: 7d
      condition: between
      threshold: 10
      threshold_max: 5
      unit: percentage
      priority: high
      actions: [flag_account]
      cooldown_hours: 24
"#;
        let queues: QueueSet = serde_yaml::from_str(yaml).unwrap();
        let result = validate_queues(&queues);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["queues[0].signals[0].threshold_max"]);
    }
}
