//! Header checks shared by all document kinds: apiVersion, kind, metadata.

use crate::schema::{RuleDocument, API_VERSION};

use super::fuzzy::is_kebab_case;
use super::ValidationResult;

pub(super) fn validate_header(doc: &RuleDocument, result: &mut ValidationResult) {
    if doc.api_version() != API_VERSION {
        result.error(
            "apiVersion",
            format!("apiVersion must be '{API_VERSION}', got '{}'", doc.api_version()),
        );
    }

    let expected = doc.kind().as_str();
    if doc.kind_label() != expected {
        result.error(
            "kind",
            format!("kind must be '{expected}', got '{}'", doc.kind_label()),
        );
    }

    let metadata = doc.metadata();
    if !is_kebab_case(&metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                metadata.id
            ),
        );
    }
    if metadata.name.trim().is_empty() {
        result.error("metadata.name", "name must not be empty");
    }
}
