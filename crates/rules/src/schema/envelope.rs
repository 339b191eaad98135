//! Document envelope for lightweight first-pass deserialization.

use serde::{Deserialize, Serialize};

use super::{CommonMetadata, Document, DocumentKind, RuleDocument};

/// First-pass deserializer that reads only the header fields.
///
/// `kind` picks the concrete document type; the whole envelope is then
/// re-read as that type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEnvelope {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    /// Remaining fields, kept raw for the second pass.
    #[serde(flatten)]
    pub rest: serde_yaml::Value,
}

impl RuleEnvelope {
    pub fn document_kind(&self) -> std::result::Result<DocumentKind, String> {
        self.kind.parse()
    }

    pub fn parse_full(&self) -> std::result::Result<RuleDocument, String> {
        Ok(match self.document_kind()? {
            DocumentKind::ValueProgram => RuleDocument::ValueProgram(self.reparse()?),
            DocumentKind::SignalQueues => RuleDocument::SignalQueues(self.reparse()?),
            DocumentKind::AttributeCatalog => RuleDocument::AttributeCatalog(self.reparse()?),
        })
    }

    fn reparse<S>(&self) -> std::result::Result<Document<S>, String>
    where
        S: serde::de::DeserializeOwned,
    {
        let value = serde_yaml::to_value(self).map_err(|e| e.to_string())?;
        serde_yaml::from_value(value).map_err(|e| format!("{} document: {e}", self.kind))
    }
}
