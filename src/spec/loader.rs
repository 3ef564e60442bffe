//! Source text ingestion
//!
//! Text is parsed as JSON or YAML, checked for an `openapi`/`swagger`
//! discriminator, normalized to the OpenAPI 3.0 shape and deserialised into
//! the typed [`SpecDocument`].

use crate::error::{ExplorerError, Result};
use crate::spec::document::SpecDocument;
use crate::spec::swagger2::{self, is_swagger2};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Textual format the document arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Yaml,
}

/// A successfully ingested document
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: SpecDocument,
    /// The normalized document as a raw value, including keys the typed model ignores
    pub normalized: Value,
    pub format: SourceFormat,
    /// Version string the source declared (`openapi` or `swagger`)
    pub source_version: String,
    pub converted_from_swagger2: bool,
}

/// Parse and normalize source text into a document
pub fn load_document(text: &str) -> Result<LoadedDocument> {
    let (raw, format) = parse_source_text(text)?;
    load_value(raw, format)
}

/// Normalize an already-parsed value into a document
pub fn load_value(raw: Value, format: SourceFormat) -> Result<LoadedDocument> {
    let converted_from_swagger2 = is_swagger2(&raw);
    let source_version = declared_version(&raw).ok_or_else(|| {
        ExplorerError::validation("Document has no 'openapi' or 'swagger' version field")
    })?;

    let normalized = swagger2::normalize(raw)?;
    let document: SpecDocument = serde_json::from_value(normalized.clone()).map_err(|e| {
        ExplorerError::validation(format!("Document does not match the OpenAPI structure: {}", e))
    })?;

    info!(
        title = document.info.title.as_str(),
        version = source_version.as_str(),
        paths = document.paths.len(),
        schemas = document.components.schemas.len(),
        converted = converted_from_swagger2,
        "Loaded API specification"
    );

    Ok(LoadedDocument {
        document,
        normalized,
        format,
        source_version,
        converted_from_swagger2,
    })
}

/// Parse text as JSON, falling back to YAML
pub fn parse_source_text(text: &str) -> Result<(Value, SourceFormat)> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Err(ExplorerError::parse("Specification text is empty"));
    }

    let json_error = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => return Ok((value, SourceFormat::Json)),
            Err(e) => Some(e),
        }
    } else {
        None
    };

    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(yaml) => {
            debug!("Parsed specification as YAML");
            Ok((yaml_to_json(yaml), SourceFormat::Yaml))
        }
        Err(yaml_error) => Err(ExplorerError::parse(match json_error {
            Some(json_error) => format!(
                "Content is neither valid JSON ({}) nor valid YAML ({})",
                json_error, yaml_error
            ),
            None => format!("Content is neither valid JSON nor valid YAML: {}", yaml_error),
        })),
    }
}

/// Convert a YAML value to JSON, stringifying non-string mapping keys
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn declared_version(raw: &Value) -> Option<String> {
    ["openapi", "swagger"].iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
