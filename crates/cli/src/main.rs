mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use loyalty_core::Config;
use loyalty_rules::documents::{DocumentStore, LoadStatus};
use loyalty_rules::kpi::KpiBase;
use loyalty_rules::program::ValueType;
use loyalty_rules::schema::{DocumentKind, RuleDocument};
use loyalty_rules::validation::{validate_document, ValidationResult};
use loyalty_rules::OnboardingStore;

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    loyalty_core::config::load_dotenv();
    let args = CliArgs::parse();

    let mut config = match &args.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(dir) = &args.dir {
        config.documents.dir = dir.clone();
    }
    config.log_summary();

    match &args.command {
        Command::Init {
            prefix,
            name,
            value_type,
        } => init(&config, prefix, name, (*value_type).into()),
        Command::Validate => validate(&config, args.json),
        Command::List => list(&config, args.json),
        Command::Show { id } => show(&config, id, args.json),
        Command::Kpis => kpis(&config, args.json),
        Command::Toggle { attributes } => toggle(&config, attributes, args.json),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config.summary())?);
            Ok(())
        }
    }
}

/// Load the documents directory, logging files that failed to parse.
fn open_store(config: &Config) -> Result<DocumentStore> {
    let mut store = DocumentStore::from_config(&config.documents);
    let results = store
        .load_all()
        .with_context(|| format!("failed to scan {}", store.dir().display()))?;
    for result in &results {
        if let LoadStatus::Failed { error } = &result.status {
            warn!(path = %result.path.display(), %error, "document not loaded");
        }
    }
    Ok(store)
}

fn load_session(config: &Config, store: &DocumentStore) -> OnboardingStore {
    OnboardingStore::from_documents(store.documents(), KpiBase::from(config.kpi))
}

fn init(config: &Config, prefix: &str, name: &str, value_type: ValueType) -> Result<()> {
    let mut session = OnboardingStore::from_config(config);
    session.set_value_type(value_type)?;

    let mut store = DocumentStore::from_config(&config.documents);
    for doc in session.to_documents(prefix, name) {
        let path = store.write_document(&doc)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn validate(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let reports: Vec<(&RuleDocument, ValidationResult)> = store
        .documents()
        .map(|doc| (doc, validate_document(doc)))
        .collect();

    if json {
        let out: serde_json::Map<String, serde_json::Value> = reports
            .iter()
            .map(|(doc, report)| Ok((doc.metadata().id.clone(), serde_json::to_value(report)?)))
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (doc, report) in &reports {
            let status = if report.valid { "ok" } else { "FAILED" };
            println!("{} ({}): {status}", doc.metadata().id, doc.kind());
            for e in &report.errors {
                println!("  error   {}: {}", e.path, e.message);
            }
            for w in &report.warnings {
                match &w.suggestion {
                    Some(s) => println!("  warning {}: {} ({s})", w.path, w.message),
                    None => println!("  warning {}: {}", w.path, w.message),
                }
            }
        }
    }

    let failed = reports.iter().filter(|(_, r)| !r.valid).count();
    if failed > 0 {
        bail!("{failed} document(s) failed validation");
    }
    Ok(())
}

fn list(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    if json {
        let rows: Vec<serde_json::Value> = store
            .documents()
            .map(|doc| {
                let id = &doc.metadata().id;
                serde_json::json!({
                    "id": id,
                    "kind": doc.kind().as_str(),
                    "name": doc.metadata().name,
                    "path": store.path_of(id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for doc in store.documents() {
        let id = &doc.metadata().id;
        let path = store
            .path_of(id)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!("{id:<32} {:<18} {path}", doc.kind().as_str());
    }
    Ok(())
}

fn show(config: &Config, id: &str, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let Some(doc) = store.get(id) else {
        bail!("no document with id '{id}' in {}", store.dir().display());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&doc.to_json()?)?);
    } else {
        print!("{}", doc.to_yaml()?);
    }
    Ok(())
}

fn kpis(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let counters = load_session(config, &store).kpis();
    if json {
        println!("{}", serde_json::to_string_pretty(&counters)?);
    } else {
        println!("total:     {}", counters.total);
        println!("analytics: {}", counters.analytics);
        println!("ai:        {}", counters.ai);
    }
    Ok(())
}

fn toggle(config: &Config, attributes: &[String], json: bool) -> Result<()> {
    let mut store = open_store(config)?;
    let Some(existing) = store.single_of_kind(DocumentKind::AttributeCatalog)?.cloned() else {
        bail!(
            "no AttributeCatalog document in {}; run `loyalty init` first",
            store.dir().display()
        );
    };

    let mut session = load_session(config, &store);
    for name in attributes {
        let enabled = session
            .toggle_attribute(name)
            .with_context(|| format!("cannot toggle '{name}'"))?;
        info!(attribute = %name, enabled, "attribute toggled");
    }

    let updated = RuleDocument::attribute_catalog(
        existing.metadata().clone(),
        session.attributes().clone(),
        Some(session.state().kpi_base()),
    );
    store.write_document(&updated)?;

    let counters = session.kpis();
    if json {
        println!("{}", serde_json::to_string_pretty(&counters)?);
    } else {
        println!(
            "kpis: total={} analytics={} ai={}",
            counters.total, counters.analytics, counters.ai
        );
    }
    Ok(())
}
