//! Endpoint extraction and derived metrics
//!
//! Flattens a document's paths into one [`EndpointRecord`] per (method, path)
//! pair, in path insertion order and fixed method order, and computes the
//! heuristic fields (complexity, response-time estimate, business context,
//! suggestions) once at construction time.

use crate::error::{ExplorerError, Result};
use crate::spec::{
    HttpMethod, MediaType, Operation, Parameter, PathItem, RequestBody, Response,
    SecurityRequirement, SpecDocument,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Bucketed complexity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn from_score(score: f64) -> Self {
        if score <= 2.0 {
            Complexity::Low
        } else if score <= 5.0 {
            Complexity::Medium
        } else {
            Complexity::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "medium" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            _ => Err(ExplorerError::unsupported_option(
                "complexity",
                s,
                &["low", "medium", "high"],
            )),
        }
    }
}

/// Bucketed response-time estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseTime {
    Fast,
    Medium,
    Slow,
}

impl ResponseTime {
    pub fn from_score(score: i32) -> Self {
        if score <= 0 {
            ResponseTime::Fast
        } else if score <= 1 {
            ResponseTime::Medium
        } else {
            ResponseTime::Slow
        }
    }
}

/// One operation, flattened with its derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    pub id: String,
    pub path: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path-level parameters first, then operation-level ones, duplicates kept
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: IndexMap<String, Response>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    /// Effective requirement: the operation's own, else the document's
    pub security: Vec<SecurityRequirement>,
    pub has_path_params: bool,
    pub has_query_params: bool,
    pub has_request_body: bool,
    pub complexity: Complexity,
    pub complexity_score: f64,
    pub estimated_response_time: ResponseTime,
    pub business_context: String,
    pub ai_suggestions: Vec<String>,
}

impl EndpointRecord {
    /// `METHOD path`, as used in messages
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn is_secured(&self) -> bool {
        self.security.iter().any(|req| !req.is_empty())
    }

    /// Request body media types, in declaration order
    pub fn request_media(&self) -> impl Iterator<Item = (&str, &MediaType)> {
        self.request_body
            .iter()
            .flat_map(|body| body.content.iter().map(|(mime, media)| (mime.as_str(), media)))
    }

    /// Response media types with their status codes
    pub fn response_media(&self) -> impl Iterator<Item = (&str, &str, &MediaType)> {
        self.responses.iter().flat_map(|(status, response)| {
            response
                .content
                .iter()
                .map(move |(mime, media)| (status.as_str(), mime.as_str(), media))
        })
    }
}

/// Derive the endpoint id: `METHOD_` followed by the path with every
/// non-alphanumeric character replaced by `_`
pub fn endpoint_id(method: HttpMethod, path: &str) -> String {
    let sanitized: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", method.as_str(), sanitized)
}

/// Walk the document's paths into the ordered endpoint list
pub fn extract_endpoints(doc: &SpecDocument) -> Vec<EndpointRecord> {
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    for (path, item) in &doc.paths {
        for (method, operation) in item.operations() {
            let mut record = build_record(doc, path, item, method, operation);
            // Distinct paths can sanitize to the same id ("/a-b" vs "/a_b")
            if !seen_ids.insert(record.id.clone()) {
                let base = record.id.clone();
                let mut n = 2;
                while !seen_ids.insert(format!("{}_{}", base, n)) {
                    n += 1;
                }
                record.id = format!("{}_{}", base, n);
                debug!(id = record.id.as_str(), "Disambiguated colliding endpoint id");
            }
            records.push(record);
        }
    }

    debug!(count = records.len(), "Extracted endpoints");
    records
}

/// Find the record for a (method, path) pair
pub fn get_endpoint<'a>(
    records: &'a [EndpointRecord],
    method: HttpMethod,
    path: &str,
) -> Result<&'a EndpointRecord> {
    records
        .iter()
        .find(|r| r.method == method && r.path == path)
        .ok_or_else(|| ExplorerError::not_found("Endpoint", format!("{} {}", method, path)))
}

fn build_record(
    doc: &SpecDocument,
    path: &str,
    item: &PathItem,
    method: HttpMethod,
    operation: &Operation,
) -> EndpointRecord {
    let parameters: Vec<Parameter> = item
        .parameters
        .iter()
        .chain(operation.parameters.iter())
        .filter_map(|entry| {
            let resolved = doc.resolve_parameter(entry);
            if resolved.is_none() {
                warn!(path, method = method.as_str(), "Skipping unresolved parameter reference");
            }
            resolved.cloned()
        })
        .collect();

    let request_body = operation.request_body.as_ref().and_then(|entry| {
        let resolved = doc.resolve_request_body(entry);
        if resolved.is_none() {
            warn!(path, method = method.as_str(), "Skipping unresolved request body reference");
        }
        resolved.cloned()
    });

    let responses: IndexMap<String, Response> = operation
        .responses
        .iter()
        .filter_map(|(status, entry)| match doc.resolve_response(entry) {
            Some(response) => Some((status.clone(), response.clone())),
            None => {
                warn!(path, status = status.as_str(), "Skipping unresolved response reference");
                None
            }
        })
        .collect();

    let security = operation
        .security
        .clone()
        .unwrap_or_else(|| doc.security.clone());

    let mut record = EndpointRecord {
        id: endpoint_id(method, path),
        path: path.to_string(),
        method,
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
        has_path_params: path.contains('{'),
        has_query_params: parameters.iter().any(|p| p.location == "query"),
        has_request_body: request_body.is_some(),
        parameters,
        request_body,
        responses,
        tags: operation.tags.clone(),
        deprecated: operation.deprecated,
        security,
        complexity: Complexity::Low,
        complexity_score: 0.0,
        estimated_response_time: ResponseTime::Fast,
        business_context: String::new(),
        ai_suggestions: Vec::new(),
    };

    record.complexity_score = complexity_score(&record);
    record.complexity = Complexity::from_score(record.complexity_score);
    record.estimated_response_time = ResponseTime::from_score(response_time_score(&record));
    record.business_context = business_context(&record);
    record.ai_suggestions = suggestions(&record);
    record
}

/// Weighted sum over parameters, body, responses, security and tags
pub fn complexity_score(record: &EndpointRecord) -> f64 {
    let mut score = 0.5 * record.parameters.len() as f64;
    if record.has_request_body {
        score += 2.0;
    }
    score += 0.3 * record.responses.len() as f64;
    if record.is_secured() {
        score += 1.0;
    }
    if record.tags.len() > 1 {
        score += 0.5;
    }
    score
}

fn mentions(text: Option<&str>, keywords: &[&str]) -> bool {
    text.map(|t| {
        let lower = t.to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    })
    .unwrap_or(false)
}

pub fn response_time_score(record: &EndpointRecord) -> i32 {
    let mut score = 0;
    if mentions(record.operation_id.as_deref(), &["get", "list"])
        || mentions(record.summary.as_deref(), &["get", "list"])
    {
        score -= 1;
    }
    if record.has_request_body {
        score += 1;
    }
    if record.parameters.len() > 5 {
        score += 1;
    }
    let searchy = ["search", "filter"];
    if mentions(record.summary.as_deref(), &searchy)
        || record.parameters.iter().any(|p| mentions(Some(p.name.as_str()), &searchy))
    {
        score += 1;
    }
    score
}

/// Last literal path segment, used as the resource noun
fn resource_name(path: &str) -> &str {
    path.split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .last()
        .unwrap_or("resource")
}

pub fn business_context(record: &EndpointRecord) -> String {
    let resource = resource_name(&record.path);
    let summary = record.summary.as_deref();

    if mentions(summary, &["create", "add"]) {
        format!("Creates new {} records, typically as part of a data-entry or onboarding workflow.", resource)
    } else if mentions(summary, &["get", "list", "fetch"]) {
        format!("Retrieves {} data for display, reporting or downstream processing.", resource)
    } else if mentions(summary, &["update", "modify"]) {
        format!("Modifies existing {} records to keep stored data current.", resource)
    } else if mentions(summary, &["delete", "remove"]) {
        format!("Removes {} records; callers should confirm before invoking.", resource)
    } else {
        let tags = if record.tags.is_empty() {
            "general".to_string()
        } else {
            record.tags.join(", ")
        };
        format!(
            "Supports the '{}' operation within the {} area of the API.",
            summary.unwrap_or(&record.path),
            tags
        )
    }
}

/// Facts the suggestion table is keyed on
#[derive(Debug, Clone, Copy)]
struct SuggestionKey {
    method: HttpMethod,
    has_identifier: bool,
    has_limit: bool,
    has_filter: bool,
}

struct SuggestionRule {
    applies: fn(&SuggestionKey) -> bool,
    text: &'static str,
}

const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Get && !k.has_identifier && !k.has_limit,
        text: "Add pagination parameters (limit/offset) to bound list responses",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Get && !k.has_identifier && !k.has_filter,
        text: "Add filter parameters so clients can narrow collection results",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Get && k.has_limit,
        text: "Document the maximum page size accepted by the limit parameter",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Get && k.has_identifier,
        text: "Support conditional requests (ETag / If-None-Match) for single-resource reads",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Post,
        text: "Return 201 Created with a Location header for newly created resources",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Post,
        text: "Validate request payloads and document 400/422 error responses",
    },
    SuggestionRule {
        applies: |k| matches!(k.method, HttpMethod::Put | HttpMethod::Patch) && k.has_identifier,
        text: "Use optimistic concurrency (If-Match) to prevent lost updates",
    },
    SuggestionRule {
        applies: |k| matches!(k.method, HttpMethod::Put | HttpMethod::Patch) && !k.has_identifier,
        text: "Address the target resource with an identifier in the path",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Delete && k.has_identifier,
        text: "Return 204 No Content and consider soft deletes for recoverability",
    },
    SuggestionRule {
        applies: |k| k.method == HttpMethod::Delete && !k.has_identifier,
        text: "Require explicit filters or confirmation for bulk deletes",
    },
];

pub fn suggestions(record: &EndpointRecord) -> Vec<String> {
    let named = |needle: &str| {
        record
            .parameters
            .iter()
            .any(|p| p.name.to_lowercase().contains(needle))
    };
    let key = SuggestionKey {
        method: record.method,
        has_identifier: record.path.contains('{'),
        has_limit: named("limit"),
        has_filter: named("filter"),
    };
    SUGGESTION_RULES
        .iter()
        .filter(|rule| (rule.applies)(&key))
        .map(|rule| rule.text.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> SpecDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_endpoint_id_sanitization() {
        assert_eq!(endpoint_id(HttpMethod::Get, "/pets/{id}"), "GET__pets__id_");
        assert_eq!(endpoint_id(HttpMethod::Delete, "/a-b.c"), "DELETE__a_b_c");
    }

    #[test]
    fn test_records_follow_path_then_method_order() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/b": {"post": {"responses": {}}, "get": {"responses": {}}},
                "/a": {"delete": {"responses": {}}}
            }
        }));
        let labels: Vec<String> = extract_endpoints(&d).iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["GET /b", "POST /b", "DELETE /a"]);
    }

    #[test]
    fn test_colliding_ids_are_disambiguated() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/a-b": {"get": {"responses": {}}},
                "/a_b": {"get": {"responses": {}}}
            }
        }));
        let ids: Vec<String> = extract_endpoints(&d).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["GET__a_b", "GET__a_b_2"]);
    }

    #[test]
    fn test_complexity_and_response_time() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "security": [{"key": []}],
            "paths": {
                "/items": {
                    "get": {
                        "summary": "List items",
                        "tags": ["a", "b"],
                        "parameters": [{"name": "limit", "in": "query"}],
                        "responses": {"200": {"description": "ok"}, "400": {"description": "bad"}}
                    },
                    "post": {
                        "summary": "Search items with filter",
                        "security": [],
                        "requestBody": {"content": {"application/json": {"schema": {"type": "object"}}}},
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        }));
        let records = extract_endpoints(&d);

        let list = &records[0];
        // 0.5 + 0.6 + 1 (global security) + 0.5 (two tags)
        assert!((list.complexity_score - 2.6).abs() < 1e-9);
        assert_eq!(list.complexity, Complexity::Medium);
        assert_eq!(list.estimated_response_time, ResponseTime::Fast);
        assert!(list.has_query_params);

        let search = &records[1];
        assert!(search.security.is_empty());
        assert!((search.complexity_score - 2.3).abs() < 1e-9);
        // body +1, "search" +1
        assert_eq!(search.estimated_response_time, ResponseTime::Slow);
    }

    #[test]
    fn test_business_context_keywords() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/users/{id}": {
                    "delete": {"summary": "Remove a user", "responses": {}},
                    "patch": {"summary": "Touch", "tags": ["admin"], "responses": {}}
                }
            }
        }));
        let records = extract_endpoints(&d);
        assert!(records[0].business_context.starts_with("Removes users records"));
        assert!(records[1].business_context.contains("'Touch'"));
        assert!(records[1].business_context.contains("admin"));
    }

    #[test]
    fn test_suggestion_table() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets": {"get": {"parameters": [{"name": "limit", "in": "query"}], "responses": {}}},
                "/pets/{id}": {"delete": {"responses": {}}}
            }
        }));
        let records = extract_endpoints(&d);
        assert_eq!(
            records[0].ai_suggestions,
            vec![
                "Add filter parameters so clients can narrow collection results",
                "Document the maximum page size accepted by the limit parameter",
            ]
        );
        assert_eq!(
            records[1].ai_suggestions,
            vec!["Return 204 No Content and consider soft deletes for recoverability"]
        );
    }

    #[test]
    fn test_get_endpoint_not_found() {
        let records: Vec<EndpointRecord> = Vec::new();
        let err = get_endpoint(&records, HttpMethod::Get, "/nope").unwrap_err();
        assert_eq!(err.to_string(), "Endpoint not found: GET /nope");
    }

    #[test]
    fn test_referenced_components_are_resolved() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets": {
                    "post": {
                        "parameters": [
                            {"$ref": "#/components/parameters/Trace"},
                            {"$ref": "#/components/parameters/Missing"}
                        ],
                        "requestBody": {"$ref": "#/components/requestBodies/PetBody"},
                        "responses": {"404": {"$ref": "#/components/responses/NotFound"}}
                    }
                }
            },
            "components": {
                "parameters": {"Trace": {"name": "X-Trace", "in": "header"}},
                "requestBodies": {"PetBody": {"content": {"application/json": {}}}},
                "responses": {"NotFound": {"description": "missing"}}
            }
        }));
        let record = &extract_endpoints(&d)[0];
        assert_eq!(record.parameters.len(), 1);
        assert_eq!(record.parameters[0].name, "X-Trace");
        assert!(record.has_request_body);
        assert_eq!(record.responses["404"].description, "missing");
    }
}
