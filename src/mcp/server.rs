//! MCP Server implementation
//!
//! One [`McpServer`] serves both transports. It owns the specification
//! session behind an async mutex, so a load and the queries around it never
//! interleave even when the HTTP transport runs handlers concurrently.

use crate::analysis::{
    analyze_security, assess_evolution, export_document, generate_code_example, generate_mock,
    get_endpoint, overview, search_endpoints, search_properties, validate_examples, BodyTarget,
    CodeLanguage, Complexity, EndpointFilters, ExportFormat, MockOptions, MockTarget,
    PropertyCriteria, SchemaGraph, SearchIn, TraceDirection,
};
use crate::config::{AnalysisConfig, Config};
use crate::error::{ExplorerError, Result};
use crate::mcp::errors::{McpError, McpErrorCode};
use crate::mcp::tools::{self, *};
use crate::mcp::types::*;
use crate::session::{LoadSummary, SpecSession};
use crate::spec::{HttpMethod, SourceFetcher, SpecSource};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// MCP Server that handles protocol communication
pub struct McpServer {
    session: Mutex<SpecSession>,
    fetcher: SourceFetcher,
    analysis: AnalysisConfig,
    tools: Vec<Tool>,
}

impl McpServer {
    pub fn new(config: &Config) -> Self {
        Self {
            session: Mutex::new(SpecSession::new()),
            fetcher: SourceFetcher::new(&config.fetch),
            analysis: config.analysis.clone(),
            tools: tool_definitions(),
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub async fn is_loaded(&self) -> bool {
        self.session.lock().await.is_loaded()
    }

    /// Load a document from a URL or path outside of any protocol request
    pub async fn load_source(&self, location: &str) -> Result<LoadSummary> {
        let source = SpecSource::from_location(location)?;
        self.fetch_and_load(&source).await
    }

    /// Handle one raw JSON-RPC message; `None` when no reply is due
    pub async fn handle_message(&self, message: &str) -> Option<String> {
        let response = match serde_json::from_str::<McpRequest>(message) {
            Ok(request) => self.handle_mcp_request(request).await?,
            Err(e) => {
                warn!("Rejecting malformed JSON-RPC message: {}", e);
                McpResponse::error(None, McpError::parse_error(format!("Invalid JSON-RPC message: {}", e)))
            }
        };
        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    pub async fn handle_mcp_request(&self, request: McpRequest) -> Option<McpResponse> {
        debug!("Handling MCP method: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::error(
                request.id,
                McpError::invalid_request(format!("Unsupported jsonrpc version '{}'", request.jsonrpc)),
            ));
        }

        // Notifications never get a reply
        let id = match request.id {
            Some(id) => id,
            None => {
                debug!("Received notification: {}", request.method);
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => McpResponse::success(id, self.initialize_result(request.params.as_ref())),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => McpResponse::success(id, json!({ "tools": self.tools })),
            "tools/call" => {
                let params = request.params.unwrap_or(json!({}));
                match serde_json::from_value::<ToolCall>(params) {
                    Ok(tool_call) => match self.call_tool(tool_call).await {
                        Ok(result) => McpResponse::success(id, json!(result)),
                        Err(e) => McpResponse::error(Some(id), e),
                    },
                    Err(e) => McpResponse::error(
                        Some(id),
                        McpError::invalid_params(format!("Invalid tool call parameters: {}", e)),
                    ),
                }
            }
            other => McpResponse::error(Some(id), McpError::method_not_found(other.to_string())),
        };
        Some(response)
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let protocol_version = match requested {
            Some(version) if SUPPORTED_PROTOCOL_VERSIONS.contains(&version) => version,
            _ => DEFAULT_PROTOCOL_VERSION,
        };
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION")}
        })
    }

    /// Run a tool. Tool failures come back as an error result; only unknown
    /// tools and malformed arguments are protocol errors.
    pub async fn call_tool(&self, call: ToolCall) -> std::result::Result<ToolResult, McpError> {
        if !self.tools.iter().any(|t| t.name == call.name) {
            return Err(McpError::tool_not_found(call.name));
        }
        let arguments = match call.arguments {
            Value::Null => json!({}),
            other => other,
        };

        match self.execute(&call.name, arguments).await {
            Ok(result) => Ok(result.with_metadata(json!({ "tool": call.name }))),
            Err(ToolFailure::Arguments(message)) => Err(McpError::with_data(
                McpErrorCode::InvalidParams,
                message,
                json!({ "tool": call.name }),
            )),
            Err(ToolFailure::Explorer(e)) => {
                warn!(tool = call.name.as_str(), category = e.category(), "Tool call failed: {}", e);
                Ok(ToolResult::error_with_metadata(
                    e.to_string(),
                    json!({ "tool": call.name, "category": e.category() }),
                ))
            }
        }
    }

    async fn execute(&self, name: &str, arguments: Value) -> std::result::Result<ToolResult, ToolFailure> {
        if name == tools::LOAD_OPENAPI_SPEC {
            let args: LoadSpecArgs = parse_args(name, arguments)?;
            return Ok(ToolResult::success(self.load(args).await?));
        }
        // Argument shape errors must win over session state
        let call = ParsedCall::parse(name, arguments)?;

        let session = self.session.lock().await;
        let loaded = session.require()?;
        let doc = &loaded.document;
        let records = loaded.endpoints.as_slice();

        let data = match call {
            ParsedCall::Overview => json!(overview(doc, records)),
            ParsedCall::SearchEndpoints(args) => {
                let filters = EndpointFilters {
                    query: args.query,
                    methods: parse_all::<HttpMethod>(&args.methods)?,
                    tags: args.tags,
                    complexity: parse_all::<Complexity>(&args.complexity)?,
                    deprecated: args.deprecated,
                    has_parameters: args.has_parameters,
                    has_request_body: args.has_request_body,
                };
                let matches: Vec<Value> = search_endpoints(records, &filters)
                    .into_iter()
                    .map(|r| {
                        json!({
                            "id": r.id,
                            "method": r.method,
                            "path": r.path,
                            "summary": r.summary,
                            "tags": r.tags,
                            "complexity": r.complexity,
                            "estimatedResponseTime": r.estimated_response_time,
                            "deprecated": r.deprecated
                        })
                    })
                    .collect();
                json!({ "total": matches.len(), "endpoints": matches })
            }
            ParsedCall::EndpointDetails(args) => {
                json!(get_endpoint(records, args.method.parse()?, &args.path)?)
            }
            ParsedCall::Dependencies(args) => {
                let direction = match args.direction.as_deref() {
                    Some(d) => d.parse()?,
                    None => TraceDirection::Both,
                };
                let depth = args.depth.unwrap_or(self.analysis.default_depth);
                json!(SchemaGraph::new(doc).trace(&args.schema_name, direction, depth)?)
            }
            ParsedCall::UnusedSchemas(args) => json!(SchemaGraph::new(doc).find_unused(
                &loaded.normalized,
                args.include_indirect_references.unwrap_or(true)
            )),
            ParsedCall::SearchProperties(args) => {
                let criteria = PropertyCriteria {
                    property_name: args.property_name,
                    property_type: args.property_type,
                    pattern: args.pattern,
                    required: args.required,
                    search_in: match args.search_in.as_deref() {
                        Some(s) => s.parse()?,
                        None => SearchIn::Both,
                    },
                };
                let depth = args.depth.unwrap_or(self.analysis.default_depth);
                let matches = search_properties(doc, records, &criteria, depth)?;
                json!({ "total": matches.len(), "matches": matches })
            }
            ParsedCall::ValidateExamples(args) => {
                let endpoint = match (args.method, args.path) {
                    (Some(method), Some(path)) => Some((method.parse::<HttpMethod>()?, path)),
                    (None, None) => None,
                    _ => {
                        return Err(ExplorerError::validation(
                            "validate_examples needs both method and path, or neither",
                        )
                        .into())
                    }
                };
                let strict = args.strict_mode.unwrap_or(self.analysis.strict_validation);
                json!(validate_examples(
                    doc,
                    records,
                    endpoint.as_ref().map(|(m, p)| (*m, p.as_str())),
                    strict
                )?)
            }
            ParsedCall::MockData(args) => {
                let target = mock_target(&args)?;
                let requested = args.count.unwrap_or(1).max(1);
                let count = requested.min(self.analysis.max_mock_count);
                if count < requested {
                    warn!(requested, count, "Mock count capped by configuration");
                }
                let options = MockOptions {
                    count,
                    realistic: args.realistic.unwrap_or(true),
                    optional_property_probability: self.analysis.optional_property_probability,
                    max_depth: self.analysis.default_depth,
                };
                json!(generate_mock(doc, records, &target, &options)?)
            }
            ParsedCall::Evolution(args) => json!(assess_evolution(doc, args.schema_name.as_deref())?),
            ParsedCall::Security => json!(analyze_security(doc, records)),
            ParsedCall::CodeExamples(args) => {
                let record = get_endpoint(records, args.method.parse()?, &args.path)?;
                let languages = match args.language.as_deref() {
                    Some(language) => vec![CodeLanguage::from_str(language)?],
                    None => CodeLanguage::ALL.to_vec(),
                };
                let examples: Vec<_> = languages
                    .into_iter()
                    .map(|language| generate_code_example(doc, record, language))
                    .collect();
                json!({ "endpoint": record.label(), "examples": examples })
            }
            ParsedCall::Export(args) => {
                let format = match args.format.as_deref() {
                    Some(f) => f.parse()?,
                    None => ExportFormat::Json,
                };
                return Ok(ToolResult::text(export_document(&loaded.normalized, format)?));
            }
        };
        Ok(ToolResult::success(data))
    }

    async fn load(&self, args: LoadSpecArgs) -> Result<Value> {
        let source = match (args.source, args.content) {
            (_, Some(content)) if !content.trim().is_empty() => SpecSource::Inline(content),
            (Some(location), _) => SpecSource::from_location(&location)?,
            _ => {
                return Err(ExplorerError::validation(
                    "load_openapi_spec needs either 'source' or 'content'",
                ))
            }
        };

        let summary = self.fetch_and_load(&source).await?;
        info!(title = summary.title.as_str(), endpoints = summary.endpoint_count, "Specification loaded via tool call");
        Ok(json!(summary))
    }

    /// The fetch runs without the session lock; only parse-and-swap holds it
    async fn fetch_and_load(&self, source: &SpecSource) -> Result<LoadSummary> {
        let text = self.fetcher.fetch(source).await?;
        let mut session = self.session.lock().await;
        Ok(session.load_text(&text, source.label())?.summary())
    }
}

/// Query tool arguments decoded into their typed shape
enum ParsedCall {
    Overview,
    SearchEndpoints(SearchEndpointsArgs),
    EndpointDetails(EndpointArgs),
    Dependencies(DependencyArgs),
    UnusedSchemas(UnusedSchemasArgs),
    SearchProperties(SearchPropertiesArgs),
    ValidateExamples(ValidateExamplesArgs),
    MockData(MockDataArgs),
    Evolution(EvolutionArgs),
    Security,
    CodeExamples(CodeExampleArgs),
    Export(ExportArgs),
}

impl ParsedCall {
    fn parse(name: &str, arguments: Value) -> std::result::Result<Self, ToolFailure> {
        let call = match name {
            tools::GET_API_OVERVIEW => ParsedCall::Overview,
            tools::SEARCH_ENDPOINTS => ParsedCall::SearchEndpoints(parse_args(name, arguments)?),
            tools::GET_ENDPOINT_DETAILS => ParsedCall::EndpointDetails(parse_args(name, arguments)?),
            tools::ANALYZE_SCHEMA_DEPENDENCIES => ParsedCall::Dependencies(parse_args(name, arguments)?),
            tools::FIND_UNUSED_SCHEMAS => ParsedCall::UnusedSchemas(parse_args(name, arguments)?),
            tools::SEARCH_PROPERTIES => ParsedCall::SearchProperties(parse_args(name, arguments)?),
            tools::VALIDATE_EXAMPLES => ParsedCall::ValidateExamples(parse_args(name, arguments)?),
            tools::GENERATE_MOCK_DATA => ParsedCall::MockData(parse_args(name, arguments)?),
            tools::ASSESS_SCHEMA_EVOLUTION => ParsedCall::Evolution(parse_args(name, arguments)?),
            tools::ANALYZE_SECURITY => ParsedCall::Security,
            tools::GENERATE_CODE_EXAMPLES => ParsedCall::CodeExamples(parse_args(name, arguments)?),
            tools::EXPORT_SPECIFICATION => ParsedCall::Export(parse_args(name, arguments)?),
            other => return Err(ToolFailure::Arguments(format!("Tool '{}' has no handler", other))),
        };
        Ok(call)
    }
}

/// Why a tool produced no result
enum ToolFailure {
    /// Arguments did not match the tool's input shape
    Arguments(String),
    Explorer(ExplorerError),
}

impl From<ExplorerError> for ToolFailure {
    fn from(error: ExplorerError) -> Self {
        ToolFailure::Explorer(error)
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> std::result::Result<T, ToolFailure> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolFailure::Arguments(format!("Invalid arguments for '{}': {}", tool, e)))
}

fn parse_all<T>(values: &[String]) -> Result<Vec<T>>
where
    T: FromStr<Err = ExplorerError>,
{
    values.iter().map(|v| v.parse()).collect()
}

fn mock_target(args: &MockDataArgs) -> Result<MockTarget> {
    match (&args.schema_name, &args.method, &args.path) {
        (Some(schema), _, _) => Ok(MockTarget::Schema(schema.clone())),
        (None, Some(method), Some(path)) => {
            let body = match args.target.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("request") => BodyTarget::Request,
                Some("response") | None => BodyTarget::Response(args.status.clone()),
                Some(other) => {
                    return Err(ExplorerError::unsupported_option("target", other, &["request", "response"]))
                }
            };
            Ok(MockTarget::Endpoint {
                method: method.parse()?,
                path: path.clone(),
                body,
            })
        }
        _ => Err(ExplorerError::validation(
            "generate_mock_data needs 'schemaName', or 'method' and 'path'",
        )),
    }
}
