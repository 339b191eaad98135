//! Entity attribute catalog: which attributes are collected and how much
//! each one contributes to the KPI counters while enabled.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use loyalty_core::{LoyaltyError, ObjectKind, Result};

/// Contribution of one attribute to the aggregate counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KpiWeight {
    pub kpis: u32,
    pub analytics: u32,
    pub ai: u32,
}

/// A single attribute row in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeEntry {
    /// Owning entity, e.g. `Location` or `Customer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    /// Identity fields that must always be collected.
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_weight: Option<KpiWeight>,
}

impl AttributeEntry {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: Some(entity.into()),
            enabled: false,
            required: false,
            kpi_weight: None,
        }
    }

    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.enabled = true;
        self
    }

    pub fn weighted(mut self, kpis: u32, analytics: u32, ai: u32) -> Self {
        self.kpi_weight = Some(KpiWeight { kpis, analytics, ai });
        self
    }

    /// Weight applied to the aggregates right now (zero while disabled).
    pub fn active_weight(&self) -> Option<KpiWeight> {
        if self.enabled { self.kpi_weight } else { None }
    }
}

/// Insertion-ordered mapping from attribute name to its entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeCatalog {
    entries: IndexMap<String, AttributeEntry>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference catalog used when onboarding starts from scratch.
    pub fn reference() -> Self {
        let mut catalog = Self::new();
        catalog.insert("CustomerId", AttributeEntry::new("Customer").required());
        catalog.insert("Email", AttributeEntry::new("Customer").required().weighted(1, 0, 0));
        catalog.insert("BirthDate", AttributeEntry::new("Customer").weighted(1, 1, 0));
        catalog.insert("Gender", AttributeEntry::new("Customer").weighted(0, 1, 1));
        catalog.insert("LifetimeSpend", AttributeEntry::new("Customer").weighted(2, 2, 1));
        catalog.insert("LocationId", AttributeEntry::new("Location").required());
        catalog.insert("SquareFootage", AttributeEntry::new("Location").weighted(3, 2, 1));
        catalog.insert("OpeningHours", AttributeEntry::new("Location").weighted(1, 1, 0));
        catalog.insert("Region", AttributeEntry::new("Location").weighted(1, 2, 1));
        catalog.insert("BasketSize", AttributeEntry::new("Transaction").weighted(2, 1, 1));
        catalog.insert("PaymentMethod", AttributeEntry::new("Transaction").weighted(1, 1, 2));
        catalog
    }

    /// Insert or replace an attribute, keeping its original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, entry: AttributeEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enabled_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, e)| e.enabled)
            .map(|(n, _)| n)
            .collect()
    }

    /// Enable or disable an attribute.
    ///
    /// Disabling a required attribute fails and leaves the catalog unchanged.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Attribute, name))?;
        if entry.required && !enabled {
            return Err(LoyaltyError::RequiredAttribute {
                name: name.to_string(),
            });
        }
        entry.enabled = enabled;
        debug!(attribute = %name, enabled, "attribute toggled");
        Ok(())
    }

    /// Flip an attribute and return its new state.
    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let current = self
            .get(name)
            .map(|e| e.enabled)
            .ok_or_else(|| LoyaltyError::not_found(ObjectKind::Attribute, name))?;
        self.set_enabled(name, !current)?;
        Ok(!current)
    }
}
