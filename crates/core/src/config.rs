use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub kpi: KpiBaseConfig,
    pub documents: DocumentsConfig,
    pub history: HistoryConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `LOYALTY_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("LOYALTY_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            kpi: KpiBaseConfig::from_env_profiled(p),
            documents: DocumentsConfig::from_env_profiled(p),
            history: HistoryConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  kpi base:    total={}, analytics={}, ai={}",
            self.kpi.total,
            self.kpi.analytics,
            self.kpi.ai
        );
        tracing::info!("  documents:   dir={}", self.documents.dir.display());
        tracing::info!("  history:     max_entries={}", self.history.max_entries);
    }

    /// Return a JSON view of the active configuration.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "kpi": { "total": self.kpi.total, "analytics": self.kpi.analytics, "ai": self.kpi.ai },
            "documents": { "dir": self.documents.dir },
            "history": { "max_entries": self.history.max_entries },
        })
    }
}

// ── KPI base counters ─────────────────────────────────────────

/// Counter floor that exists independent of any enabled attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiBaseConfig {
    pub total: u32,
    pub analytics: u32,
    pub ai: u32,
}

impl Default for KpiBaseConfig {
    fn default() -> Self {
        Self {
            total: 10,
            analytics: 5,
            ai: 3,
        }
    }
}

impl KpiBaseConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            total: profiled_env_u32(p, "LOYALTY_KPI_BASE_TOTAL", d.total),
            analytics: profiled_env_u32(p, "LOYALTY_KPI_BASE_ANALYTICS", d.analytics),
            ai: profiled_env_u32(p, "LOYALTY_KPI_BASE_AI", d.ai),
        }
    }
}

// ── Documents ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Directory holding onboarding YAML documents.
    pub dir: PathBuf,
}

impl DocumentsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dir: PathBuf::from(profiled_env_or(p, "LOYALTY_DOCUMENTS_DIR", "data/onboarding")),
        }
    }
}

// ── Change history ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum change-log entries kept in memory (FIFO eviction).
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 200 }
    }
}

impl HistoryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_entries: profiled_env_usize(p, "LOYALTY_HISTORY_MAX_ENTRIES", Self::default().max_entries),
        }
    }
}
