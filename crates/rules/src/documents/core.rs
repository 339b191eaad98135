//! [`DocumentStore`]: filesystem-backed document loading and writing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use loyalty_core::config::DocumentsConfig;

use crate::schema::{DocumentKind, RuleDocument, RuleEnvelope};
use crate::validation::fuzzy::is_kebab_case;
use crate::validation::validate_document;

use super::error::{LoadResult, LoadStatus, Result, StoreError};

/// In-memory view of a document directory, keyed by `metadata.id`.
pub struct DocumentStore {
    dir: PathBuf,
    documents: BTreeMap<String, StoredDocument>,
}

struct StoredDocument {
    path: PathBuf,
    document: RuleDocument,
}

impl DocumentStore {
    /// Open a store rooted at `dir`, creating the directory if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!(path = %dir.display(), error = %e, "failed to create documents directory");
            }
        }
        Self {
            dir,
            documents: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &DocumentsConfig) -> Self {
        Self::new(config.dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recursively scan the directory and load every YAML document.
    ///
    /// Dotfiles and non-YAML files are skipped. A file that fails to parse,
    /// or reuses an id already loaded from another file, is reported as
    /// failed without aborting the scan. Entries are visited in name order.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let root = self.dir.clone();
        self.scan_dir(&root, &mut results)?;
        info!(
            path = %self.dir.display(),
            loaded = results.iter().filter(|r| r.is_loaded()).count(),
            failed = results.iter().filter(|r| r.is_failed()).count(),
            "document scan finished"
        );
        Ok(results)
    }

    fn scan_dir(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let mut paths = match fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|e| e.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };
        paths.sort();

        for path in paths {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden {
                if path.is_file() {
                    results.push(skipped(path, "dotfile"));
                }
                continue;
            }

            if path.is_dir() {
                self.scan_dir(&path, results)?;
                continue;
            }

            if !is_yaml(&path) {
                results.push(skipped(path, "not a YAML file"));
                continue;
            }

            let status = match Self::load_file(&path) {
                Ok(doc) => self.insert_loaded(&path, doc),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load document");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }
        Ok(())
    }

    fn insert_loaded(&mut self, path: &Path, document: RuleDocument) -> LoadStatus {
        let id = document.metadata().id.clone();
        if let Some(existing) = self.documents.get(&id) {
            if existing.path != path {
                let error = format!(
                    "id '{id}' is already defined in {}",
                    existing.path.display()
                );
                warn!(path = %path.display(), %error, "duplicate document id");
                return LoadStatus::Failed { error };
            }
        }
        info!(id = %id, kind = %document.kind(), path = %path.display(), "loaded document");
        self.documents.insert(
            id.clone(),
            StoredDocument {
                path: path.to_path_buf(),
                document,
            },
        );
        LoadStatus::Loaded { id }
    }

    /// Parse a single YAML file: envelope first, then the kind-specific document.
    pub fn load_file(path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;
        let envelope: RuleEnvelope = serde_yaml::from_str(&contents)?;
        if envelope.metadata.id.trim().is_empty() {
            return Err(StoreError::Invalid(
                "metadata.id must not be empty".to_string(),
            ));
        }
        envelope.parse_full().map_err(|e| {
            StoreError::Invalid(format!(
                "failed to parse '{}': {e}",
                envelope.metadata.id
            ))
        })
    }

    pub fn get(&self, id: &str) -> Option<&RuleDocument> {
        self.documents.get(id).map(|d| &d.document)
    }

    /// File a document was loaded from or written to.
    pub fn path_of(&self, id: &str) -> Option<&Path> {
        self.documents.get(id).map(|d| d.path.as_path())
    }

    /// Documents ordered by id.
    pub fn documents(&self) -> impl Iterator<Item = &RuleDocument> {
        self.documents.values().map(|d| &d.document)
    }

    pub fn of_kind(&self, kind: DocumentKind) -> impl Iterator<Item = &RuleDocument> {
        self.documents().filter(move |d| d.kind() == kind)
    }

    /// The only document of `kind`, or `None` when there is none.
    ///
    /// More than one document of the kind is an error, since callers that
    /// write the document back could not tell which file to update.
    pub fn single_of_kind(&self, kind: DocumentKind) -> Result<Option<&RuleDocument>> {
        let mut docs = self.of_kind(kind);
        let first = docs.next();
        if let Some(second) = docs.next() {
            let first_id = first.map(|d| d.metadata().id.as_str()).unwrap_or_default();
            return Err(StoreError::Invalid(format!(
                "expected one {kind} document, found '{first_id}' and '{}'",
                second.metadata().id
            )));
        }
        Ok(first)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Validate and atomically write a document to `<dir>/<id>.yml`.
    ///
    /// The YAML is written to a dot-prefixed `.tmp` file first and renamed
    /// into place, so readers never observe a partial file.
    pub fn write_document(&mut self, doc: &RuleDocument) -> Result<PathBuf> {
        let id = doc.metadata().id.clone();
        let report = validate_document(doc);
        if !report.valid {
            return Err(StoreError::Validation {
                id,
                errors: report.error_count(),
            });
        }

        let final_path = self
            .path_of(&id)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.dir.join(format!("{id}.yml")));
        let tmp_path = self.dir.join(format!(".{id}.tmp"));

        let yaml = doc.to_yaml()?;
        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &final_path)?;

        info!(id = %id, kind = %doc.kind(), path = %final_path.display(), "wrote document");
        self.documents.insert(
            id,
            StoredDocument {
                path: final_path.clone(),
                document: doc.clone(),
            },
        );
        Ok(final_path)
    }

    /// Delete a document's file and its in-memory entry.
    pub fn delete_document(&mut self, id: &str) -> Result<()> {
        if !is_kebab_case(id) {
            return Err(StoreError::Invalid(format!(
                "document id '{id}' must be kebab-case"
            )));
        }
        let candidates = [
            self.path_of(id).map(Path::to_path_buf),
            Some(self.dir.join(format!("{id}.yml"))),
            Some(self.dir.join(format!("{id}.yaml"))),
        ];
        let path = candidates
            .into_iter()
            .flatten()
            .find(|p| p.is_file())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        fs::remove_file(&path)?;
        self.documents.remove(id);
        info!(id = %id, path = %path.display(), "deleted document");
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yml" || e == "yaml")
}

fn skipped(path: PathBuf, reason: &str) -> LoadResult {
    debug!(path = %path.display(), reason, "skipping file");
    LoadResult {
        path,
        status: LoadStatus::Skipped {
            reason: reason.to_string(),
        },
    }
}
