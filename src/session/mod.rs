//! Specification session
//!
//! Holds at most one loaded document and its endpoint records. Every load
//! is all-or-nothing: the new document replaces the old one only after it
//! has been fetched, parsed, normalized and extracted without error.

use crate::analysis::{extract_endpoints, EndpointRecord};
use crate::error::{ExplorerError, Result};
use crate::spec::{load_document, SourceFetcher, SourceFormat, SpecDocument, SpecSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// A document together with everything derived from it at load time
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    /// Changes on every successful load
    pub id: String,
    pub document: SpecDocument,
    pub normalized: Value,
    pub endpoints: Vec<EndpointRecord>,
    pub source: String,
    pub format: SourceFormat,
    pub source_version: String,
    pub converted_from_swagger2: bool,
    pub loaded_at: DateTime<Utc>,
}

/// What a load reports back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub id: String,
    pub title: String,
    pub version: String,
    pub source: String,
    pub format: SourceFormat,
    pub source_version: String,
    pub converted_from_swagger2: bool,
    pub endpoint_count: usize,
    pub schema_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedSpec {
    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            id: self.id.clone(),
            title: self.document.info.title.clone(),
            version: self.document.info.version.clone(),
            source: self.source.clone(),
            format: self.format,
            source_version: self.source_version.clone(),
            converted_from_swagger2: self.converted_from_swagger2,
            endpoint_count: self.endpoints.len(),
            schema_count: self.document.schemas().len(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Lifecycle: empty, then loaded, then replaced by each later load
#[derive(Debug, Default)]
pub struct SpecSession {
    current: Option<LoadedSpec>,
}

impl SpecSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&LoadedSpec> {
        self.current.as_ref()
    }

    /// The loaded document, or [`ExplorerError::NotLoaded`]
    pub fn require(&self) -> Result<&LoadedSpec> {
        self.current.as_ref().ok_or(ExplorerError::NotLoaded)
    }

    /// Parse `text` and make it the current document
    pub fn load_text(&mut self, text: &str, source: impl Into<String>) -> Result<&LoadedSpec> {
        let source = source.into();
        let loaded = match load_document(text) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(source = source.as_str(), error = %e, "Specification load failed; keeping previous document");
                return Err(e);
            }
        };
        let endpoints = extract_endpoints(&loaded.document);

        let spec = LoadedSpec {
            id: Uuid::new_v4().to_string(),
            document: loaded.document,
            normalized: loaded.normalized,
            endpoints,
            source,
            format: loaded.format,
            source_version: loaded.source_version,
            converted_from_swagger2: loaded.converted_from_swagger2,
            loaded_at: Utc::now(),
        };
        info!(
            session = spec.id.as_str(),
            source = spec.source.as_str(),
            endpoints = spec.endpoints.len(),
            replaced = self.current.is_some(),
            "Session document replaced"
        );
        Ok(self.current.insert(spec))
    }

    /// Fetch `source` and load it; a failed fetch leaves the session untouched
    pub async fn load_from(&mut self, fetcher: &SourceFetcher, source: &SpecSource) -> Result<&LoadedSpec> {
        let text = fetcher.fetch(source).await?;
        self.load_text(&text, source.label())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str = r#"{
        "openapi": "3.0.0",
        "info": {"title": "Pets", "version": "1"},
        "paths": {"/pets": {"get": {"responses": {"200": {"description": "ok"}}}}}
    }"#;

    const STORES: &str = "openapi: 3.0.0\ninfo:\n  title: Stores\n  version: '2'\npaths:\n  /stores:\n    get:\n      responses: {}\n    post:\n      responses: {}\n";

    #[test]
    fn test_empty_session_requires_load() {
        let session = SpecSession::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.require(), Err(ExplorerError::NotLoaded)));
    }

    #[test]
    fn test_load_replaces_document() {
        let mut session = SpecSession::new();
        let first_id = session.load_text(PETS, "pets.json").unwrap().id.clone();
        let loaded = session.load_text(STORES, "stores.yaml").unwrap();
        assert_ne!(loaded.id, first_id);
        assert_eq!(loaded.document.info.title, "Stores");
        assert_eq!(loaded.endpoints.len(), 2);
        assert_eq!(loaded.format, SourceFormat::Yaml);
    }

    #[test]
    fn test_failed_load_keeps_previous_document() {
        let mut session = SpecSession::new();
        session.load_text(PETS, "pets.json").unwrap();

        let err = session.load_text("{\"info\": {}}", "broken.json").unwrap_err();
        assert_eq!(err.category(), "validation");
        let err = session.load_text("{ not json", "broken.json").unwrap_err();
        assert_eq!(err.category(), "parse");

        let current = session.require().unwrap();
        assert_eq!(current.document.info.title, "Pets");
        assert_eq!(current.source, "pets.json");
    }

    #[test]
    fn test_summary() {
        let mut session = SpecSession::new();
        let summary = session.load_text(PETS, "pets.json").unwrap().summary();
        assert_eq!(summary.title, "Pets");
        assert_eq!(summary.endpoint_count, 1);
        assert!(!summary.converted_from_swagger2);

        session.clear();
        assert!(!session.is_loaded());
    }
}
