//! Finalize-time validation with structured errors and suggestions.
//!
//! Mutations already refuse out-of-range values one at a time. The checks
//! here look at a whole aggregate (usually just deserialized from a
//! document) and report everything at once, including cross-field and
//! cross-object problems no single mutation can see.
//! Returns a [`ValidationResult`] with errors (block save) and warnings (advisory).

mod attribute_checks;
mod header_checks;
mod program_checks;
mod queue_checks;

pub mod fuzzy;

use serde::{Deserialize, Serialize};

use loyalty_core::LoyaltyError;

use crate::attributes::AttributeCatalog;
use crate::program::ValueProgram;
use crate::queue::QueueSet;
use crate::schema::RuleDocument;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-path-like location, e.g. `"spec.tiers[1].threshold"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn warn_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
            suggestion,
        });
    }

    /// Record a model error. Range errors carry their own field path;
    /// anything else is reported at `path`.
    pub(crate) fn issue(&mut self, path: &str, err: LoyaltyError) {
        match err {
            LoyaltyError::InvalidRange { field, reason } => self.error(field, reason),
            other => self.error(path, other.to_string()),
        }
    }

    /// Append another report's findings.
    pub fn merge(&mut self, other: ValidationResult) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Join a root path and a child segment, skipping the dot for an empty root.
pub(crate) fn join(root: &str, child: &str) -> String {
    if root.is_empty() {
        child.to_string()
    } else {
        format!("{root}.{child}")
    }
}

// ── Public API ──────────────────────────────────────────────────────

pub fn validate_program(program: &ValueProgram) -> ValidationResult {
    let mut result = ValidationResult::new();
    program_checks::validate_program(program, "", &mut result);
    result
}

pub fn validate_queues(queues: &QueueSet) -> ValidationResult {
    let mut result = ValidationResult::new();
    queue_checks::validate_queues(queues, "queues", &mut result);
    result
}

pub fn validate_attributes(catalog: &AttributeCatalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    attribute_checks::validate_attributes(catalog, "attributes", &mut result);
    result
}

/// Validate any [`RuleDocument`] variant: header first, then the spec body.
pub fn validate_document(doc: &RuleDocument) -> ValidationResult {
    let mut result = ValidationResult::new();
    header_checks::validate_header(doc, &mut result);
    match doc {
        RuleDocument::ValueProgram(d) => {
            program_checks::validate_program(&d.spec, "spec", &mut result);
        }
        RuleDocument::SignalQueues(d) => {
            queue_checks::validate_queues(&d.spec.queues, "spec.queues", &mut result);
        }
        RuleDocument::AttributeCatalog(d) => {
            attribute_checks::validate_attributes(&d.spec.attributes, "spec.attributes", &mut result);
        }
    }
    result
}

/// Parse raw YAML and validate. Parse failures are reported as a root error.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match RuleDocument::from_yaml(yaml) {
        Ok(doc) => validate_document(&doc),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CommonMetadata;

    #[test]
    fn document_header_is_checked() {
        let mut doc = RuleDocument::value_program(
            CommonMetadata::new("Coffee_Rewards", " "),
            ValueProgram::default(),
        );
        if let RuleDocument::ValueProgram(d) = &mut doc {
            d.api_version = "v2".to_string();
        }
        let result = validate_document(&doc);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["apiVersion", "metadata.id", "metadata.name"]);
    }

    #[test]
    fn mismatched_kind_label_is_an_error() {
        let mut doc = RuleDocument::signal_queues(
            CommonMetadata::new("fraud-queues", "Fraud"),
            QueueSet::new(),
        );
        if let RuleDocument::SignalQueues(d) = &mut doc {
            d.kind = "signalqueues".to_string();
        }
        let result = validate_document(&doc);
        assert_eq!(result.errors[0].path, "kind");
    }

    #[test]
    fn spec_paths_are_rooted_at_spec() {
        let yaml = r#"
apiVersion: v1
kind: ValueProgram
metadata: { id: empty-tiers, name: Empty tiers }
spec:
  value_config: { value_type: credits, credit_name: Credits }
  use_tiers: true
"#;
        let result = validate_yaml(yaml);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "spec.tiers");
    }

    #[test]
    fn parse_failure_is_a_root_error() {
        let result = validate_yaml("apiVersion: v1\nkind: [unclosed\n");
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "");
        assert!(result.errors[0].message.starts_with("YAML parse error"));
    }

    #[test]
    fn report_serializes_without_empty_suggestions() {
        let mut result = ValidationResult::new();
        result.error("spec.tiers", "missing");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert!(json["errors"][0].get("suggestion").is_none());
    }
}
