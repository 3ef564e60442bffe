//! API overview and document export

use crate::analysis::endpoints::{Complexity, EndpointRecord};
use crate::error::{ExplorerError, Result};
use crate::spec::SpecDocument;
use indexmap::IndexMap;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverview {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub openapi_version: String,
    pub servers: Vec<String>,
    pub endpoint_count: usize,
    pub schema_count: usize,
    pub methods: IndexMap<String, usize>,
    pub tags: IndexMap<String, usize>,
    pub complexity: ComplexityBreakdown,
    pub deprecated_endpoints: usize,
    pub security_schemes: Vec<String>,
}

pub fn overview(doc: &SpecDocument, records: &[EndpointRecord]) -> ApiOverview {
    let mut methods: IndexMap<String, usize> = IndexMap::new();
    let mut tags: IndexMap<String, usize> = IndexMap::new();
    let mut complexity = ComplexityBreakdown::default();

    for record in records {
        *methods.entry(record.method.to_string()).or_default() += 1;
        for tag in &record.tags {
            *tags.entry(tag.clone()).or_default() += 1;
        }
        match record.complexity {
            Complexity::Low => complexity.low += 1,
            Complexity::Medium => complexity.medium += 1,
            Complexity::High => complexity.high += 1,
        }
    }

    ApiOverview {
        title: doc.info.title.clone(),
        version: doc.info.version.clone(),
        description: doc.info.description.clone(),
        openapi_version: doc.openapi.clone(),
        servers: doc.server_urls(),
        endpoint_count: records.len(),
        schema_count: doc.schemas().len(),
        methods,
        tags,
        complexity,
        deprecated_endpoints: records.iter().filter(|r| r.deprecated).count(),
        security_schemes: doc.components.security_schemes.keys().cloned().collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl FromStr for ExportFormat {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(ExplorerError::unsupported_option("format", s, &["json", "yaml"])),
        }
    }
}

/// Serialize the normalized document
pub fn export_document<T: Serialize>(doc: &T, format: ExportFormat) -> Result<String> {
    let text = match format {
        ExportFormat::Json => serde_json::to_string_pretty(doc)?,
        ExportFormat::Yaml => serde_yaml::to_string(doc)?,
    };
    Ok(text)
}
