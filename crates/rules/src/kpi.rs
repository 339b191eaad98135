//! KPI derivation: aggregate counters recomputed in full from the attribute
//! catalog. No incremental bookkeeping; the output is a pure function of the
//! catalog snapshot and the base floor.

use serde::{Deserialize, Serialize};

use loyalty_core::config::KpiBaseConfig;

use crate::attributes::AttributeCatalog;

/// Counter floor that exists independent of any attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiBase {
    pub total: u32,
    pub analytics: u32,
    pub ai: u32,
}

impl Default for KpiBase {
    fn default() -> Self {
        KpiBaseConfig::default().into()
    }
}

impl From<KpiBaseConfig> for KpiBase {
    fn from(c: KpiBaseConfig) -> Self {
        Self {
            total: c.total,
            analytics: c.analytics,
            ai: c.ai,
        }
    }
}

/// Aggregate KPI counters shown alongside the attribute picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KpiCounters {
    pub total: u32,
    pub analytics: u32,
    pub ai: u32,
}

impl From<KpiBase> for KpiCounters {
    fn from(b: KpiBase) -> Self {
        Self {
            total: b.total,
            analytics: b.analytics,
            ai: b.ai,
        }
    }
}

/// Derive counters from the full attribute set.
///
/// Every enabled attribute with a weight adds its components to the base.
/// Attributes without a weight contribute nothing.
pub fn derive_kpis(catalog: &AttributeCatalog, base: &KpiBase) -> KpiCounters {
    catalog
        .iter()
        .filter_map(|(_, entry)| entry.active_weight())
        .fold(KpiCounters::from(*base), |acc, w| KpiCounters {
            total: acc.total.saturating_add(w.kpis),
            analytics: acc.analytics.saturating_add(w.analytics),
            ai: acc.ai.saturating_add(w.ai),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeEntry;

    #[test]
    fn square_footage_scenario() {
        let mut catalog = AttributeCatalog::new();
        catalog.insert(
            "SquareFootage",
            AttributeEntry::new("Location").enabled().weighted(3, 2, 1),
        );
        let counters = derive_kpis(&catalog, &KpiBase::default());
        assert_eq!(counters, KpiCounters { total: 13, analytics: 7, ai: 4 });
    }

    #[test]
    fn empty_catalog_yields_base_floor() {
        let base = KpiBase { total: 1, analytics: 2, ai: 3 };
        let counters = derive_kpis(&AttributeCatalog::new(), &base);
        assert_eq!(counters, KpiCounters { total: 1, analytics: 2, ai: 3 });
    }

    #[test]
    fn disabled_and_unweighted_attributes_contribute_zero() {
        let mut catalog = AttributeCatalog::new();
        catalog.insert("Region", AttributeEntry::new("Location").weighted(5, 5, 5));
        catalog.insert("Nickname", AttributeEntry::new("Customer").enabled());
        let counters = derive_kpis(&catalog, &KpiBase::default());
        assert_eq!(counters, KpiCounters::from(KpiBase::default()));
    }

    #[test]
    fn derivation_is_idempotent() {
        let catalog = AttributeCatalog::reference();
        let base = KpiBase::default();
        assert_eq!(derive_kpis(&catalog, &base), derive_kpis(&catalog, &base));
    }

    #[test]
    fn counters_saturate_instead_of_overflowing() {
        let mut catalog = AttributeCatalog::new();
        catalog.insert("Huge", AttributeEntry::new("X").enabled().weighted(u32::MAX, 0, 0));
        let counters = derive_kpis(&catalog, &KpiBase::default());
        assert_eq!(counters.total, u32::MAX);
    }
}
