//! Kind-specific documents and the multi-kind container.

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeCatalog;
use crate::kpi::KpiBase;
use crate::program::ValueProgram;
use crate::queue::QueueSet;

use super::{CommonMetadata, DocumentKind, API_VERSION};

/// Header fields plus a kind-specific `spec` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document<S> {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: S,
}

impl<S> Document<S> {
    fn new(kind: DocumentKind, metadata: CommonMetadata, spec: S) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: kind.to_string(),
            metadata,
            spec,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalQueuesSpec {
    #[serde(default)]
    pub queues: QueueSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeCatalogSpec {
    /// Overrides the configured KPI floor for this catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_base: Option<KpiBase>,
    #[serde(default)]
    pub attributes: AttributeCatalog,
}

pub type ValueProgramDocument = Document<ValueProgram>;
pub type SignalQueuesDocument = Document<SignalQueuesSpec>;
pub type AttributeCatalogDocument = Document<AttributeCatalogSpec>;

/// A fully deserialized document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDocument {
    /// Value type, its configuration, tiers and program-wide earning rules.
    ValueProgram(ValueProgramDocument),
    /// Signal queues and their templates.
    SignalQueues(SignalQueuesDocument),
    /// Collected attributes with their KPI weights.
    AttributeCatalog(AttributeCatalogDocument),
}

impl RuleDocument {
    pub fn value_program(metadata: CommonMetadata, program: ValueProgram) -> Self {
        RuleDocument::ValueProgram(Document::new(DocumentKind::ValueProgram, metadata, program))
    }

    pub fn signal_queues(metadata: CommonMetadata, queues: QueueSet) -> Self {
        RuleDocument::SignalQueues(Document::new(
            DocumentKind::SignalQueues,
            metadata,
            SignalQueuesSpec { queues },
        ))
    }

    pub fn attribute_catalog(
        metadata: CommonMetadata,
        attributes: AttributeCatalog,
        kpi_base: Option<KpiBase>,
    ) -> Self {
        RuleDocument::AttributeCatalog(Document::new(
            DocumentKind::AttributeCatalog,
            metadata,
            AttributeCatalogSpec {
                kpi_base,
                attributes,
            },
        ))
    }

    /// Parse YAML text: envelope first, then the concrete kind.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, String> {
        let envelope: super::RuleEnvelope =
            serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
        envelope.parse_full()
    }

    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            RuleDocument::ValueProgram(d) => &d.metadata,
            RuleDocument::SignalQueues(d) => &d.metadata,
            RuleDocument::AttributeCatalog(d) => &d.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut CommonMetadata {
        match self {
            RuleDocument::ValueProgram(d) => &mut d.metadata,
            RuleDocument::SignalQueues(d) => &mut d.metadata,
            RuleDocument::AttributeCatalog(d) => &mut d.metadata,
        }
    }

    pub fn api_version(&self) -> &str {
        match self {
            RuleDocument::ValueProgram(d) => &d.api_version,
            RuleDocument::SignalQueues(d) => &d.api_version,
            RuleDocument::AttributeCatalog(d) => &d.api_version,
        }
    }

    /// Raw `kind` string as written in the document.
    pub fn kind_label(&self) -> &str {
        match self {
            RuleDocument::ValueProgram(d) => &d.kind,
            RuleDocument::SignalQueues(d) => &d.kind,
            RuleDocument::AttributeCatalog(d) => &d.kind,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            RuleDocument::ValueProgram(_) => DocumentKind::ValueProgram,
            RuleDocument::SignalQueues(_) => DocumentKind::SignalQueues,
            RuleDocument::AttributeCatalog(_) => DocumentKind::AttributeCatalog,
        }
    }

    pub fn as_value_program(&self) -> Option<&ValueProgram> {
        match self {
            RuleDocument::ValueProgram(d) => Some(&d.spec),
            _ => None,
        }
    }

    pub fn as_signal_queues(&self) -> Option<&QueueSet> {
        match self {
            RuleDocument::SignalQueues(d) => Some(&d.spec.queues),
            _ => None,
        }
    }

    pub fn as_attribute_catalog(&self) -> Option<&AttributeCatalogSpec> {
        match self {
            RuleDocument::AttributeCatalog(d) => Some(&d.spec),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            RuleDocument::ValueProgram(d) => serde_json::to_value(d),
            RuleDocument::SignalQueues(d) => serde_json::to_value(d),
            RuleDocument::AttributeCatalog(d) => serde_json::to_value(d),
        }
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        match self {
            RuleDocument::ValueProgram(d) => serde_yaml::to_string(d),
            RuleDocument::SignalQueues(d) => serde_yaml::to_string(d),
            RuleDocument::AttributeCatalog(d) => serde_yaml::to_string(d),
        }
    }
}
