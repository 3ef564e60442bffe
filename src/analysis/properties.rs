//! Deep property search over request and response schemas

use crate::analysis::endpoints::EndpointRecord;
use crate::error::{ExplorerError, Result};
use crate::spec::{MediaType, RefGuard, Resolved, SchemaEdge, SchemaNode, SchemaResolver, SpecDocument};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// Which bodies to search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIn {
    Request,
    Response,
    #[default]
    Both,
}

impl FromStr for SearchIn {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "request" | "requests" => Ok(SearchIn::Request),
            "response" | "responses" => Ok(SearchIn::Response),
            "both" => Ok(SearchIn::Both),
            _ => Err(ExplorerError::unsupported_option(
                "searchIn",
                s,
                &["request", "response", "both"],
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyCriteria {
    /// Case-insensitive substring of the property name
    pub property_name: Option<String>,
    /// Exact declared type
    pub property_type: Option<String>,
    /// Regex tested against the description, or the name when there is none
    pub pattern: Option<String>,
    pub required: Option<bool>,
    pub search_in: SearchIn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMatch {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    /// Dotted route to the property, e.g. `Pet.tags[items].name`
    pub path: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,
    pub endpoint: String,
    /// `request` or `response <status>`
    pub location: String,
    pub media_type: String,
}

struct CompiledCriteria<'c> {
    name: Option<String>,
    property_type: Option<&'c str>,
    pattern: Option<Regex>,
    required: Option<bool>,
}

impl<'c> CompiledCriteria<'c> {
    fn compile(criteria: &'c PropertyCriteria) -> Result<Self> {
        let pattern = match criteria.pattern.as_deref() {
            Some(p) => Some(
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ExplorerError::validation(format!("Invalid pattern '{}': {}", p, e)))?,
            ),
            None => None,
        };
        Ok(Self {
            name: criteria.property_name.as_ref().map(|n| n.to_lowercase()),
            property_type: criteria.property_type.as_deref(),
            pattern,
            required: criteria.required,
        })
    }

    fn accepts(&self, candidate: &PropertyMatch) -> bool {
        if let Some(name) = &self.name {
            if !candidate.name.to_lowercase().contains(name.as_str()) {
                return false;
            }
        }
        if let Some(wanted) = self.property_type {
            if candidate.property_type.as_deref() != Some(wanted) {
                return false;
            }
        }
        if let Some(pattern) = &self.pattern {
            let text = candidate.description.as_deref().unwrap_or(&candidate.name);
            if !pattern.is_match(text) && !pattern.is_match(&candidate.name) {
                return false;
            }
        }
        if let Some(required) = self.required {
            if candidate.required != required {
                return false;
            }
        }
        true
    }
}

/// Where the walk currently is, for labelling matches
struct Origin<'r> {
    endpoint: String,
    location: String,
    media_type: &'r str,
}

struct PropertyWalker<'a, 'c> {
    resolver: SchemaResolver<'a>,
    criteria: CompiledCriteria<'c>,
    matches: Vec<PropertyMatch>,
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

impl<'a, 'c> PropertyWalker<'a, 'c> {
    fn walk(&mut self, node: &SchemaNode, path: &str, guard: &RefGuard, origin: &Origin<'_>) {
        let (schema, guard) = match self.resolver.follow(node, guard) {
            Resolved::Schema(schema, guard) => (schema, guard),
            Resolved::Missing(_) | Resolved::Stopped(..) => return,
        };

        // Every reference on the route contributes its schema name
        let base = match node.reference_name() {
            Some(name) => join(path, name),
            None => path.to_string(),
        };

        for (edge, child) in schema.children() {
            match edge {
                SchemaEdge::Property(name) => {
                    let prop_path = join(&base, name);
                    let resolved = self.resolver.resolve(child);
                    let candidate = PropertyMatch {
                        name: name.to_string(),
                        property_type: resolved.effective_type().map(String::from),
                        path: prop_path.clone(),
                        required: schema.is_required(name),
                        description: resolved.description.clone(),
                        format: resolved.format.clone(),
                        example: resolved.example.clone(),
                        enumeration: resolved.enumeration.clone(),
                        endpoint: origin.endpoint.clone(),
                        location: origin.location.clone(),
                        media_type: origin.media_type.to_string(),
                    };
                    if self.criteria.accepts(&candidate) {
                        self.matches.push(candidate);
                    }
                    self.walk(child, &prop_path, &guard, origin);
                }
                SchemaEdge::Items => {
                    let items_path = format!("{}[items]", base);
                    self.walk(child, &items_path, &guard, origin);
                }
                SchemaEdge::Not => {}
                other => self.walk(child, &join(&base, &other.to_string()), &guard, origin),
            }
        }
    }

    fn walk_media(&mut self, media: &MediaType, origin: &Origin<'_>, depth: usize) {
        if let Some(schema) = &media.schema {
            self.walk(schema, "", &RefGuard::new(depth), origin);
        }
    }
}

/// Search every endpoint body for properties satisfying all criteria
pub fn search_properties(
    doc: &SpecDocument,
    records: &[EndpointRecord],
    criteria: &PropertyCriteria,
    depth: usize,
) -> Result<Vec<PropertyMatch>> {
    let mut walker = PropertyWalker {
        resolver: SchemaResolver::new(doc.schemas()),
        criteria: CompiledCriteria::compile(criteria)?,
        matches: Vec::new(),
    };

    for record in records {
        if criteria.search_in != SearchIn::Response {
            for (mime, media) in record.request_media() {
                let origin = Origin {
                    endpoint: record.label(),
                    location: "request".to_string(),
                    media_type: mime,
                };
                walker.walk_media(media, &origin, depth);
            }
        }
        if criteria.search_in != SearchIn::Request {
            for (status, mime, media) in record.response_media() {
                let origin = Origin {
                    endpoint: record.label(),
                    location: format!("response {}", status),
                    media_type: mime,
                };
                walker.walk_media(media, &origin, depth);
            }
        }
    }

    tracing::debug!(matches = walker.matches.len(), "Property search finished");
    Ok(walker.matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::endpoints::extract_endpoints;
    use serde_json::json;

    fn fixture() -> (SpecDocument, Vec<EndpointRecord>) {
        let doc: SpecDocument = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets": {
                    "post": {
                        "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}},
                        "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {
                            "type": "array", "items": {"$ref": "#/components/schemas/Pet"}
                        }}}}}
                    }
                }
            },
            "components": {"schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string", "description": "Display name"},
                        "ownerEmail": {"type": "string", "format": "email"},
                        "tags": {"type": "array", "items": {"type": "object", "properties": {"label": {"type": "string"}}}},
                        "parent": {"$ref": "#/components/schemas/Pet"},
                        "variant": {"oneOf": [{"type": "object", "properties": {"breed": {"type": "string"}}}]}
                    }
                }
            }}
        }))
        .unwrap();
        let records = extract_endpoints(&doc);
        (doc, records)
    }

    fn paths(matches: &[PropertyMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.path.as_str()).collect()
    }

    #[test]
    fn test_paths_include_ref_items_and_composition_segments() {
        let (doc, records) = fixture();
        let criteria = PropertyCriteria {
            search_in: SearchIn::Request,
            ..Default::default()
        };
        let matches = search_properties(&doc, &records, &criteria, 5).unwrap();
        assert_eq!(
            paths(&matches),
            vec![
                "Pet.name",
                "Pet.ownerEmail",
                "Pet.tags",
                "Pet.tags[items].label",
                "Pet.parent",
                "Pet.variant",
                "Pet.variant.oneOf[0].breed",
            ]
        );
    }

    #[test]
    fn test_name_filter_is_case_insensitive_and_covers_responses() {
        let (doc, records) = fixture();
        let criteria = PropertyCriteria {
            property_name: Some("EMAIL".to_string()),
            ..Default::default()
        };
        let matches = search_properties(&doc, &records, &criteria, 5).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].location, "request");
        assert_eq!(matches[1].location, "response 200");
        assert_eq!(matches[1].path, "[items].Pet.ownerEmail");
        assert_eq!(matches[0].format.as_deref(), Some("email"));
    }

    #[test]
    fn test_nested_reference_names_become_segments() {
        let doc: SpecDocument = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {"/orders": {"get": {"responses": {"200": {"description": "ok", "content": {
                "application/json": {"schema": {"type": "array", "items": {"$ref": "#/components/schemas/Order"}}}
            }}}}}},
            "components": {"schemas": {
                "Order": {"type": "object", "properties": {"customer": {"$ref": "#/components/schemas/Customer"}}},
                "Customer": {"type": "object", "properties": {"city": {"type": "string"}}}
            }}
        }))
        .unwrap();
        let records = extract_endpoints(&doc);
        let criteria = PropertyCriteria {
            property_name: Some("city".to_string()),
            ..Default::default()
        };
        let matches = search_properties(&doc, &records, &criteria, 5).unwrap();
        assert_eq!(paths(&matches), vec!["[items].Order.customer.Customer.city"]);
    }

    #[test]
    fn test_type_required_and_pattern_filters() {
        let (doc, records) = fixture();
        let criteria = PropertyCriteria {
            property_type: Some("string".to_string()),
            required: Some(true),
            pattern: Some("display".to_string()),
            search_in: SearchIn::Request,
            ..Default::default()
        };
        let matches = search_properties(&doc, &records, &criteria, 5).unwrap();
        assert_eq!(paths(&matches), vec!["Pet.name"]);
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let (doc, records) = fixture();
        let criteria = PropertyCriteria {
            pattern: Some("([unclosed".to_string()),
            ..Default::default()
        };
        let err = search_properties(&doc, &records, &criteria, 5).unwrap_err();
        assert_eq!(err.category(), "validation");
    }
}
