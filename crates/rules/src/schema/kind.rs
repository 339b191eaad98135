//! Document kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    ValueProgram,
    SignalQueues,
    AttributeCatalog,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::ValueProgram,
        DocumentKind::SignalQueues,
        DocumentKind::AttributeCatalog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::ValueProgram => "ValueProgram",
            DocumentKind::SignalQueues => "SignalQueues",
            DocumentKind::AttributeCatalog => "AttributeCatalog",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DocumentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown document kind: '{s}'"))
    }
}
