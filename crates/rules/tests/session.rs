//! End-to-end onboarding session: documents in, mutations, documents out.

use std::path::PathBuf;

use tempfile::TempDir;

use loyalty_rules::documents::{DocumentStore, StoreError};
use loyalty_rules::history::{ChangeAction, ChangeOutcome, ChangeQuery};
use loyalty_rules::kpi::{KpiBase, KpiCounters};
use loyalty_rules::program::ValueType;
use loyalty_rules::schema::DocumentKind;
use loyalty_rules::tier::{NewTier, TierColor};
use loyalty_rules::OnboardingStore;

fn onboarding_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/onboarding")
}

fn cafe_session() -> OnboardingStore {
    let mut docs = DocumentStore::new(onboarding_dir());
    docs.load_all().expect("scan onboarding dir");
    OnboardingStore::from_documents(docs.documents(), KpiBase::default())
}

#[test]
fn sample_catalog_derives_expected_counters() {
    let session = cafe_session();
    assert_eq!(
        session.kpis(),
        KpiCounters {
            total: 13,
            analytics: 7,
            ai: 4
        }
    );
}

#[test]
fn toggling_updates_counters_immediately() {
    let mut session = cafe_session();
    assert!(session.toggle_attribute("Region").unwrap());
    assert_eq!(
        session.kpis(),
        KpiCounters {
            total: 14,
            analytics: 9,
            ai: 5
        }
    );
    session.set_attribute_enabled("SquareFootage", false).unwrap();
    assert_eq!(
        session.kpis(),
        KpiCounters {
            total: 11,
            analytics: 7,
            ai: 4
        }
    );
}

#[test]
fn required_attribute_stays_enabled() {
    let mut session = cafe_session();
    let before = session.kpis();
    assert!(session.toggle_attribute("CustomerId").is_err());
    assert!(session.attributes().get("CustomerId").unwrap().enabled);
    assert_eq!(session.kpis(), before);
}

#[test]
fn edited_session_writes_back_to_disk() {
    let mut session = cafe_session();
    session.set_value_type(ValueType::Cashback).unwrap();
    session
        .add_tier(NewTier::new("Platinum", 2000.0, TierColor::Platinum))
        .unwrap();
    assert!(session.validate().valid);

    let dir = TempDir::new().unwrap();
    let mut out = DocumentStore::new(dir.path());
    for doc in session.to_documents("cafe", "Cafe") {
        out.write_document(&doc).unwrap();
    }

    let mut reread = DocumentStore::new(dir.path());
    let results = reread.load_all().unwrap();
    assert_eq!(results.iter().filter(|r| r.is_loaded()).count(), 3);

    let restored = OnboardingStore::from_documents(reread.documents(), KpiBase::default());
    assert_eq!(restored.state(), session.state());
    assert_eq!(restored.program().tiers().len(), 3);
}

#[test]
fn history_records_every_attempt() {
    let mut session = cafe_session();
    session.toggle_attribute("BasketSize").unwrap();
    let _ = session.toggle_attribute("LocationId");
    let _ = session.toggle_attribute("NoSuchAttribute");

    let all = session.history().query(&ChangeQuery::default());
    assert_eq!(all.len(), 3);
    assert!(all
        .iter()
        .all(|e| e.action == ChangeAction::ToggleAttribute));
    assert_eq!(all[2].outcome, ChangeOutcome::Committed);
    assert_eq!(all[0].target, "NoSuchAttribute");
    assert_eq!(all[0].outcome, ChangeOutcome::Rejected);
}

#[test]
fn second_attribute_catalog_makes_write_back_ambiguous() {
    let dir = TempDir::new().unwrap();
    for file in ["cafe-attributes.yml", "cafe-program.yml"] {
        std::fs::copy(onboarding_dir().join(file), dir.path().join(file)).unwrap();
    }
    let extra = std::fs::read_to_string(onboarding_dir().join("cafe-attributes.yml"))
        .unwrap()
        .replace("id: cafe-attributes", "id: kiosk-attributes");
    std::fs::write(dir.path().join("kiosk-attributes.yml"), extra).unwrap();

    let mut docs = DocumentStore::new(dir.path());
    docs.load_all().unwrap();
    assert_eq!(docs.of_kind(DocumentKind::AttributeCatalog).count(), 2);
    let err = docs
        .single_of_kind(DocumentKind::AttributeCatalog)
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));

    std::fs::remove_file(dir.path().join("kiosk-attributes.yml")).unwrap();
    let mut docs = DocumentStore::new(dir.path());
    docs.load_all().unwrap();
    let catalog = docs
        .single_of_kind(DocumentKind::AttributeCatalog)
        .unwrap()
        .expect("one catalog");
    assert_eq!(catalog.metadata().id, "cafe-attributes");
}
