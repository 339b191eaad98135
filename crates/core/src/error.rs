use std::fmt;

use thiserror::Error;

/// Which kind of configuration object an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Tier,
    Queue,
    Signal,
    Attribute,
    Document,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Tier => write!(f, "tier"),
            ObjectKind::Queue => write!(f, "queue"),
            ObjectKind::Signal => write!(f, "signal"),
            ObjectKind::Attribute => write!(f, "attribute"),
            ObjectKind::Document => write!(f, "document"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoyaltyError {
    #[error("incomplete template: missing {}", missing.join(", "))]
    IncompleteTemplate { missing: Vec<&'static str> },

    #[error("invalid range for '{field}': {reason}")]
    InvalidRange { field: String, reason: String },

    #[error("config variant mismatch: expected '{expected}', got '{found}'")]
    VariantMismatch { expected: String, found: String },

    #[error("attribute '{name}' is required and cannot be disabled")]
    RequiredAttribute { name: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: ObjectKind, id: String },

    #[error("{kind} name already in use: {name}")]
    DuplicateName { kind: ObjectKind, name: String },

    #[error("{kind} id already present: {id}")]
    DuplicateId { kind: ObjectKind, id: String },
}

impl LoyaltyError {
    pub fn invalid_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoyaltyError::InvalidRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: ObjectKind, id: impl ToString) -> Self {
        LoyaltyError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Caller-correctable errors: the UI re-prompts and keeps its draft.
    pub fn is_validation(&self) -> bool {
        !self.is_lookup()
    }

    /// Operations against ids the model does not hold.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            LoyaltyError::NotFound { .. } | LoyaltyError::DuplicateId { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LoyaltyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_template_lists_every_field() {
        let err = LoyaltyError::IncompleteTemplate {
            missing: vec!["name", "metric"],
        };
        assert_eq!(err.to_string(), "incomplete template: missing name, metric");
        assert!(err.is_validation());
    }

    #[test]
    fn lookup_errors_are_not_validation() {
        let err = LoyaltyError::not_found(ObjectKind::Tier, "abc");
        assert!(err.is_lookup());
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "tier not found: abc");
    }
}
