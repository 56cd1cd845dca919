//! Domain descriptions stored as JSON documents

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::DomainModel;
use super::fluent::Fluents;
use crate::error::{NavfieldError, Result};

/// On-disk layout of a compiled domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDocument {
    pub name: String,
    #[serde(default)]
    pub non_fluents: Fluents,
    #[serde(default)]
    pub initial_state: Fluents,
}

/// A domain read from a [`DomainDocument`]
#[derive(Debug, Clone)]
pub struct JsonDomain {
    document: DomainDocument,
    source: PathBuf,
}

impl JsonDomain {
    /// Resolve a domain id to a document.
    ///
    /// The id is tried as a path first, then as `<search_dir>/<id>.json` and
    /// finally with the id lowercased.
    pub fn resolve(id: &str, search_dir: &Path) -> Result<Self> {
        let candidates = candidate_paths(id, search_dir);

        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            return Err(NavfieldError::DomainNotFound {
                id: id.to_string(),
                searched: candidates,
            });
        };

        tracing::debug!("Domain '{}' resolved to {}", id, path.display());
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| NavfieldError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, source: &Path) -> Result<Self> {
        let document: DomainDocument =
            serde_json::from_str(text).map_err(|e| NavfieldError::Config {
                path: source.to_path_buf(),
                reason: e.to_string(),
            })?;

        for (name, value) in document.non_fluents.iter().chain(&document.initial_state) {
            value.validate(name)?;
        }

        Ok(Self {
            document,
            source: source.to_path_buf(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl DomainModel for JsonDomain {
    fn name(&self) -> &str {
        &self.document.name
    }

    fn constants(&self) -> &Fluents {
        &self.document.non_fluents
    }

    fn initial_state(&self) -> &Fluents {
        &self.document.initial_state
    }
}

fn candidate_paths(id: &str, search_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(id), search_dir.join(format!("{id}.json"))];
    let lowered = id.to_lowercase();
    if lowered != id {
        candidates.push(search_dir.join(format!("{lowered}.json")));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAVIGATION: &str = r#"{
        "name": "Navigation-test",
        "non_fluents": {
            "GOAL/1": {"shape": [2], "data": [8.0, 12.0]},
            "DECELERATION_ZONE_CENTER/2": {"shape": [1, 2], "data": [3.0, 4.0]},
            "DECELERATION_ZONE_DECAY/1": {"shape": [1], "data": [2.0]}
        },
        "initial_state": {
            "location/1": {"shape": [2], "data": [0.0, 0.0]}
        }
    }"#;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("navfield-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_by_id_in_search_dir() {
        let dir = scratch_dir("resolve-id");
        fs::write(dir.join("navigation-test.json"), NAVIGATION).unwrap();

        let domain = JsonDomain::resolve("Navigation-Test", &dir).unwrap();
        assert_eq!(domain.name(), "Navigation-test");
        assert!(domain.constants().contains_key("GOAL/1"));
        assert!(domain.initial_state().contains_key("location/1"));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_resolve_by_path() {
        let dir = scratch_dir("resolve-path");
        let path = dir.join("custom.json");
        fs::write(&path, NAVIGATION).unwrap();

        let domain = JsonDomain::resolve(path.to_str().unwrap(), Path::new("/nonexistent")).unwrap();
        assert_eq!(domain.source(), path.as_path());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unknown_id() {
        let err = JsonDomain::resolve("Nowhere-v9", Path::new("/nonexistent")).unwrap_err();
        match err {
            NavfieldError::DomainNotFound { id, searched } => {
                assert_eq!(id, "Nowhere-v9");
                assert_eq!(searched.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_document() {
        let err = JsonDomain::parse("{ not json", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, NavfieldError::Config { .. }));
    }

    #[test]
    fn test_inconsistent_fluent_rejected_on_load() {
        let text = r#"{"name": "bad", "non_fluents": {"GOAL/1": {"shape": [2], "data": [1.0]}}}"#;
        let err = JsonDomain::parse(text, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, NavfieldError::Fluent { .. }));
    }
}
