//! Tool catalogue
//!
//! Tool definitions advertised through `tools/list` and the argument shapes
//! `tools/call` deserialises into.

use crate::mcp::types::Tool;
use serde::Deserialize;
use serde_json::json;

pub const LOAD_OPENAPI_SPEC: &str = "load_openapi_spec";
pub const GET_API_OVERVIEW: &str = "get_api_overview";
pub const SEARCH_ENDPOINTS: &str = "search_endpoints";
pub const GET_ENDPOINT_DETAILS: &str = "get_endpoint_details";
pub const ANALYZE_SCHEMA_DEPENDENCIES: &str = "analyze_schema_dependencies";
pub const FIND_UNUSED_SCHEMAS: &str = "find_unused_schemas";
pub const SEARCH_PROPERTIES: &str = "search_properties";
pub const VALIDATE_EXAMPLES: &str = "validate_examples";
pub const GENERATE_MOCK_DATA: &str = "generate_mock_data";
pub const ASSESS_SCHEMA_EVOLUTION: &str = "assess_schema_evolution";
pub const ANALYZE_SECURITY: &str = "analyze_security";
pub const GENERATE_CODE_EXAMPLES: &str = "generate_code_examples";
pub const EXPORT_SPECIFICATION: &str = "export_specification";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSpecArgs {
    /// URL or file path
    pub source: Option<String>,
    /// Raw JSON or YAML text
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEndpointsArgs {
    pub query: Option<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub complexity: Vec<String>,
    pub deprecated: Option<bool>,
    pub has_parameters: Option<bool>,
    pub has_request_body: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointArgs {
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyArgs {
    pub schema_name: String,
    pub direction: Option<String>,
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedSchemasArgs {
    pub include_indirect_references: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPropertiesArgs {
    pub property_name: Option<String>,
    pub property_type: Option<String>,
    pub pattern: Option<String>,
    pub required: Option<bool>,
    pub search_in: Option<String>,
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateExamplesArgs {
    pub method: Option<String>,
    pub path: Option<String>,
    pub strict_mode: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDataArgs {
    pub schema_name: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    /// `request` or `response`
    pub target: Option<String>,
    /// Response status; defaults to the first 2xx
    pub status: Option<String>,
    pub count: Option<usize>,
    pub realistic: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionArgs {
    pub schema_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExampleArgs {
    pub method: String,
    pub path: String,
    /// All languages when absent
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArgs {
    pub format: Option<String>,
}

/// Every tool the server exposes, in listing order
pub fn tool_definitions() -> Vec<Tool> {
    let method = json!({"type": "string", "description": "HTTP method, e.g. GET"});
    let path = json!({"type": "string", "description": "Path template exactly as declared, e.g. /pets/{id}"});

    vec![
        Tool::new(
            LOAD_OPENAPI_SPEC,
            "Load an OpenAPI 3.x or Swagger 2.0 document from a URL, a file path or inline content. Replaces the current document only if loading succeeds.",
            json!({
                "type": "object",
                "properties": {
                    "source": {"type": "string", "description": "URL or file path of the document"},
                    "content": {"type": "string", "description": "Document text (JSON or YAML)"}
                }
            }),
        ),
        Tool::new(
            GET_API_OVERVIEW,
            "Summarise the loaded API: metadata, servers, endpoint and schema counts, methods, tags and complexity.",
            json!({"type": "object", "properties": {}}),
        ),
        Tool::new(
            SEARCH_ENDPOINTS,
            "Search endpoints. All supplied filters must match.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Substring of path, operation id, summary, description or tag"},
                    "methods": {"type": "array", "items": {"type": "string"}},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "complexity": {"type": "array", "items": {"type": "string", "enum": ["low", "medium", "high"]}},
                    "deprecated": {"type": "boolean"},
                    "hasParameters": {"type": "boolean"},
                    "hasRequestBody": {"type": "boolean"}
                }
            }),
        ),
        Tool::new(
            GET_ENDPOINT_DETAILS,
            "Full record for one endpoint, including derived complexity, response-time estimate and suggestions.",
            json!({
                "type": "object",
                "properties": {"method": method, "path": path},
                "required": ["method", "path"]
            }),
        ),
        Tool::new(
            ANALYZE_SCHEMA_DEPENDENCIES,
            "Trace which schemas a schema depends on, which depend on it, and its dependency tree with cycles marked.",
            json!({
                "type": "object",
                "properties": {
                    "schemaName": {"type": "string"},
                    "direction": {"type": "string", "enum": ["dependencies", "dependents", "both"], "default": "both"},
                    "depth": {"type": "integer", "minimum": 1, "default": 5}
                },
                "required": ["schemaName"]
            }),
        ),
        Tool::new(
            FIND_UNUSED_SCHEMAS,
            "List component schemas that nothing reachable from the paths refers to.",
            json!({
                "type": "object",
                "properties": {
                    "includeIndirectReferences": {"type": "boolean", "default": true}
                }
            }),
        ),
        Tool::new(
            SEARCH_PROPERTIES,
            "Search request and response schemas for properties by name, type, pattern and required flag.",
            json!({
                "type": "object",
                "properties": {
                    "propertyName": {"type": "string", "description": "Case-insensitive substring"},
                    "propertyType": {"type": "string"},
                    "pattern": {"type": "string", "description": "Regex matched against description or name"},
                    "required": {"type": "boolean"},
                    "searchIn": {"type": "string", "enum": ["request", "response", "both"], "default": "both"},
                    "depth": {"type": "integer", "minimum": 1}
                }
            }),
        ),
        Tool::new(
            VALIDATE_EXAMPLES,
            "Check declared examples against their schemas, for one endpoint or all of them.",
            json!({
                "type": "object",
                "properties": {
                    "method": method,
                    "path": path,
                    "strictMode": {"type": "boolean", "description": "Also reject properties the schema does not declare"}
                }
            }),
        ),
        Tool::new(
            GENERATE_MOCK_DATA,
            "Generate sample values for a component schema or an endpoint's request or response body.",
            json!({
                "type": "object",
                "properties": {
                    "schemaName": {"type": "string"},
                    "method": method,
                    "path": path,
                    "target": {"type": "string", "enum": ["request", "response"], "default": "response"},
                    "status": {"type": "string"},
                    "count": {"type": "integer", "minimum": 1, "default": 1},
                    "realistic": {"type": "boolean", "default": true}
                }
            }),
        ),
        Tool::new(
            ASSESS_SCHEMA_EVOLUTION,
            "Advisory extensibility and breaking-change risk scores for one schema or all of them.",
            json!({
                "type": "object",
                "properties": {"schemaName": {"type": "string"}}
            }),
        ),
        Tool::new(
            ANALYZE_SECURITY,
            "Summarise security schemes, their usage, unprotected endpoints and notable patterns.",
            json!({"type": "object", "properties": {}}),
        ),
        Tool::new(
            GENERATE_CODE_EXAMPLES,
            "Request snippets for an endpoint in curl, JavaScript or Python.",
            json!({
                "type": "object",
                "properties": {
                    "method": method,
                    "path": path,
                    "language": {"type": "string", "enum": ["curl", "javascript", "python"]}
                },
                "required": ["method", "path"]
            }),
        ),
        Tool::new(
            EXPORT_SPECIFICATION,
            "Export the normalized document as JSON or YAML.",
            json!({
                "type": "object",
                "properties": {
                    "format": {"type": "string", "enum": ["json", "yaml"], "default": "json"}
                }
            }),
        ),
    ]
}
