//! Tests for document schema types.

use super::*;
use crate::earning::BirthdayReward;
use crate::program::{HybridStrategyKind, ValueConfig, ValueType};
use crate::signal::{ConditionKind, PeriodKind};

const PROGRAM_YAML: &str = r#"
apiVersion: v1
kind: ValueProgram
metadata:
  id: coffee-rewards
  name: Coffee Rewards
  tags: [retail, points]
spec:
  value_config:
    value_type: points
    points_name: Beans
    point_value: 0.01
    expiration_months: 12
  use_tiers: true
  tiers:
    - id: 3b1f3c1e-8f7d-4c55-9a35-5d2a6f0e9a11
      name: Bronze
      threshold: 0
      color: bronze
      benefits: [Free refill]
      earning_rules:
        base_rate: { units_earned: 1, per_spend: 1 }
        behavioral_bonuses:
          birthday:
            enabled: true
            params: { reward_type: multiplier, multiplier: 3 }
  program_earning_rules:
    base_rate: { units_earned: 2, per_spend: 1 }
    category_multipliers:
      espresso: 1.5
      pastries: 2
"#;

const HYBRID_YAML: &str = r#"
apiVersion: v1
kind: ValueProgram
metadata:
  id: hybrid-program
  name: Hybrid
spec:
  value_config:
    value_type: hybrid
    strategy: both
    dual: { primary_type: points, primary_rate: 1, secondary_type: cashback, secondary_rate: 0.5 }
    conversion: { from_type: points, from_amount: 100, to_type: cashback, to_amount: 1, auto_convert: true }
"#;

const QUEUES_YAML: &str = r#"
apiVersion: v1
kind: SignalQueues
metadata:
  id: default-queues
  name: Default queues
spec:
  queues:
    - id: 0b6c7c56-2f0e-4d7b-8f5e-0c7c3f1f4b2a
      name: Fraud
      signals:
        - id: 9a0d2f44-1b7e-4a4c-9c1d-2e5f6a7b8c9d
          name: Return abuse
          metric: return_rate
          operator: threshold_breach
          period: 30d
          condition: between
          threshold: 15
          threshold_max: 40
          unit: percentage
          priority: high
          actions: [flag_account, notify_team]
          cooldown_hours: 24
"#;

const ATTRIBUTES_YAML: &str = r#"
apiVersion: v1
kind: AttributeCatalog
metadata:
  id: retail-attributes
  name: Retail attributes
spec:
  kpi_base: { total: 10, analytics: 5, ai: 3 }
  attributes:
    CustomerId: { entity: Customer, enabled: true, required: true }
    SquareFootage:
      entity: Location
      enabled: true
      kpi_weight: { kpis: 3, analytics: 2, ai: 1 }
"#;

#[test]
fn parse_value_program_document() {
    let doc = RuleDocument::from_yaml(PROGRAM_YAML).unwrap();
    assert_eq!(doc.kind(), DocumentKind::ValueProgram);
    assert_eq!(doc.metadata().id, "coffee-rewards");

    let program = doc.as_value_program().unwrap();
    assert_eq!(program.value_type(), ValueType::Points);
    assert!(program.use_tiers());
    assert_eq!(program.tiers().len(), 1);
    assert_eq!(
        program.tiers()[0]
            .earning_rules
            .behavioral_bonuses
            .birthday
            .active(),
        Some(&BirthdayReward::Multiplier { multiplier: 3.0 })
    );
    let multipliers: Vec<&str> = program
        .program_earning_rules()
        .category_multipliers
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(multipliers, vec!["espresso", "pastries"]);
}

#[test]
fn parse_hybrid_strategy() {
    let doc = RuleDocument::from_yaml(HYBRID_YAML).unwrap();
    let program = doc.as_value_program().unwrap();
    let ValueConfig::Hybrid(strategy) = program.value_config() else {
        panic!("expected hybrid config");
    };
    assert_eq!(strategy.kind(), HybridStrategyKind::Both);
    assert!(strategy.conversion().unwrap().auto_convert);
}

#[test]
fn parse_signal_queues_document() {
    let doc = RuleDocument::from_yaml(QUEUES_YAML).unwrap();
    let queues = doc.as_signal_queues().unwrap();
    assert_eq!(queues.queues().len(), 1);
    let queue = &queues.queues()[0];
    assert!(queue.enabled);
    let signal = &queue.signals()[0];
    assert_eq!(signal.window.kind(), PeriodKind::Last30Days);
    assert_eq!(signal.condition.kind(), ConditionKind::Between);
    assert_eq!(signal.actions.len(), 2);
}

#[test]
fn parse_attribute_catalog_document() {
    let doc = RuleDocument::from_yaml(ATTRIBUTES_YAML).unwrap();
    let spec = doc.as_attribute_catalog().unwrap();
    assert_eq!(spec.attributes.len(), 2);
    assert_eq!(spec.kpi_base.map(|b| b.total), Some(10));
    assert!(spec.attributes.get("CustomerId").unwrap().required);
}

#[test]
fn unknown_kind_is_rejected() {
    let yaml = PROGRAM_YAML.replace("kind: ValueProgram", "kind: LoyaltyEngine");
    let err = RuleDocument::from_yaml(&yaml).unwrap_err();
    assert!(err.contains("unknown document kind"), "{err}");
}

#[test]
fn unknown_spec_field_is_rejected() {
    let yaml = PROGRAM_YAML.replace("use_tiers: true", "use_tiers: true\n  tier_mode: strict");
    assert!(RuleDocument::from_yaml(&yaml).is_err());
}

#[test]
fn missing_metadata_is_rejected() {
    let yaml = "apiVersion: v1\nkind: SignalQueues\nspec: { queues: [] }\n";
    assert!(RuleDocument::from_yaml(yaml).is_err());
}

#[test]
fn yaml_round_trip_preserves_documents() {
    for yaml in [PROGRAM_YAML, HYBRID_YAML, QUEUES_YAML, ATTRIBUTES_YAML] {
        let doc = RuleDocument::from_yaml(yaml).unwrap();
        let back = RuleDocument::from_yaml(&doc.to_yaml().unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}

#[test]
fn constructors_fill_header() {
    let doc = RuleDocument::value_program(
        CommonMetadata::new("starter", "Starter"),
        crate::program::ValueProgram::new(ValueType::Cashback),
    );
    assert_eq!(doc.api_version(), API_VERSION);
    assert_eq!(doc.kind_label(), "ValueProgram");
    let json = doc.to_json().unwrap();
    assert_eq!(json["spec"]["value_config"]["value_type"], "cashback");
}

#[test]
fn kind_parses_from_str() {
    for kind in DocumentKind::ALL {
        assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
    }
    assert!("AnomalyRule".parse::<DocumentKind>().is_err());
}
