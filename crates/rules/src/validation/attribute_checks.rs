//! Attribute catalog checks.

use crate::attributes::AttributeCatalog;

use super::ValidationResult;

pub(super) fn validate_attributes(catalog: &AttributeCatalog, root: &str, result: &mut ValidationResult) {
    for (name, entry) in catalog.iter() {
        let path = format!("{root}.{name}");
        if name.trim().is_empty() {
            result.error(&path, "attribute name must not be empty");
        }
        if entry.required && !entry.enabled {
            result.error(
                format!("{path}.enabled"),
                format!("'{name}' is required and must stay enabled"),
            );
        }
        if entry.entity.is_none() {
            result.warn(&path, format!("'{name}' is not linked to an entity"));
        }
    }

    if catalog.enabled_names().is_empty() {
        result.warn(root, "no attributes are enabled; KPI counters stay at their base");
    }
}

#[cfg(test)]
mod tests {
    use crate::attributes::AttributeEntry;
    use crate::validation::validate_attributes;

    use super::*;

    #[test]
    fn reference_catalog_is_valid() {
        let result = validate_attributes(&AttributeCatalog::reference());
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn disabled_required_attribute_from_a_document_is_an_error() {
        let yaml = "CustomerId: { entity: Customer, enabled: false, required: true }\n";
        let catalog: AttributeCatalog = serde_yaml::from_str(yaml).unwrap();
        let result = validate_attributes(&catalog);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "attributes.CustomerId.enabled");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn unlinked_attribute_is_a_warning() {
        let mut catalog = AttributeCatalog::new();
        let mut entry = AttributeEntry::new("Customer").enabled();
        entry.entity = None;
        catalog.insert("Nickname", entry);
        let result = validate_attributes(&catalog);
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "attributes.Nickname");
    }
}
