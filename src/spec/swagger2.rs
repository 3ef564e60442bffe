//! Swagger 2.0 → OpenAPI 3.0 normalizer
//!
//! Converts a Swagger 2.0 document into the OpenAPI 3.0 shape that the rest
//! of the crate reads. The conversion produces a `serde_json::Value` so that
//! the result can be inspected, exported or deserialised into
//! [`SpecDocument`](crate::spec::SpecDocument).

use crate::error::{ExplorerError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

// ===== Swagger 2.0 Data Structures =====

/// Swagger 2.0 specification root
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2Spec {
    pub swagger: String,
    #[serde(default)]
    pub info: Swagger2Info,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Option<Vec<String>>,
    #[serde(default)]
    pub paths: IndexMap<String, Swagger2PathItem>,
    pub definitions: Option<IndexMap<String, Swagger2Schema>>,
    pub parameters: Option<IndexMap<String, Swagger2Parameter>>,
    pub responses: Option<IndexMap<String, Swagger2Response>>,
    pub security_definitions: Option<IndexMap<String, Swagger2SecurityScheme>>,
    pub security: Option<Value>,
    pub tags: Option<Value>,
    pub external_docs: Option<Value>,
}

/// Swagger 2.0 info object
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2Info {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Value>,
    pub license: Option<Value>,
}

/// Swagger 2.0 path item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Swagger2PathItem {
    pub get: Option<Swagger2Operation>,
    pub post: Option<Swagger2Operation>,
    pub put: Option<Swagger2Operation>,
    pub delete: Option<Swagger2Operation>,
    pub options: Option<Swagger2Operation>,
    pub head: Option<Swagger2Operation>,
    pub patch: Option<Swagger2Operation>,
    pub parameters: Option<Vec<Swagger2ParameterOrRef>>,
}

impl Swagger2PathItem {
    fn operations(&self) -> [(&'static str, Option<&Swagger2Operation>); 7] {
        [
            ("get", self.get.as_ref()),
            ("post", self.post.as_ref()),
            ("put", self.put.as_ref()),
            ("delete", self.delete.as_ref()),
            ("patch", self.patch.as_ref()),
            ("options", self.options.as_ref()),
            ("head", self.head.as_ref()),
        ]
    }
}

/// Swagger 2.0 operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2Operation {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub parameters: Option<Vec<Swagger2ParameterOrRef>>,
    #[serde(default)]
    pub responses: IndexMap<String, Swagger2ResponseOrRef>,
    pub deprecated: Option<bool>,
    pub security: Option<Value>,
}

/// A parameter entry is either inline or a `#/parameters/X` reference
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Swagger2ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(Swagger2Parameter),
}

/// Swagger 2.0 parameter
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    pub required: Option<bool>,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub format: Option<String>,
    pub schema: Option<Box<Swagger2Schema>>,
    pub items: Option<Box<Swagger2Schema>>,
    pub default: Option<Value>,
    #[serde(rename = "enum")]
    pub enumeration: Option<Vec<Value>>,
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub min_length: Option<Value>,
    pub max_length: Option<Value>,
    pub pattern: Option<String>,
    #[serde(rename = "x-example")]
    pub example: Option<Value>,
}

/// A response entry is either inline or a `#/responses/X` reference
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Swagger2ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(Swagger2Response),
}

/// Swagger 2.0 response
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger2Response {
    #[serde(default)]
    pub description: String,
    pub schema: Option<Box<Swagger2Schema>>,
    pub headers: Option<Value>,
    pub examples: Option<IndexMap<String, Value>>,
}

/// Swagger 2.0 schema
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<Value>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub properties: Option<IndexMap<String, Swagger2Schema>>,
    pub items: Option<Box<Swagger2Schema>>,
    pub all_of: Option<Vec<Swagger2Schema>>,
    pub additional_properties: Option<Value>,
    pub required: Option<Vec<String>>,
    pub default: Option<Value>,
    #[serde(rename = "enum")]
    pub enumeration: Option<Vec<Value>>,
    pub example: Option<Value>,
    #[serde(rename = "x-nullable")]
    pub nullable: Option<bool>,
    /// Remaining constraint keywords (minimum, pattern, readOnly, x-*...)
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Swagger 2.0 security definition
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub description: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub flow: Option<String>,
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub scopes: Option<IndexMap<String, String>>,
}

/// Whether a raw document carries a `swagger: "2.x"` discriminator
pub fn is_swagger2(value: &Value) -> bool {
    value
        .get("swagger")
        .map(|v| match v {
            Value::String(s) => s.starts_with("2."),
            Value::Number(n) => n.as_f64().map(|f| (2.0..3.0).contains(&f)).unwrap_or(false),
            _ => false,
        })
        .unwrap_or(false)
}

/// Normalize a raw document into the OpenAPI 3.0 shape.
///
/// Swagger 2.0 documents are converted; documents with an `openapi` field pass
/// through unchanged; anything else is a validation error.
pub fn normalize(value: Value) -> Result<Value> {
    if !value.is_object() {
        return Err(ExplorerError::validation(
            "Specification must be a JSON/YAML object",
        ));
    }
    if is_swagger2(&value) {
        return Swagger2Converter::convert(value);
    }
    match value.get("openapi") {
        Some(Value::String(_)) => Ok(value),
        Some(other) => Err(ExplorerError::validation(format!(
            "Field 'openapi' must be a version string, found {}",
            other
        ))),
        None => Err(ExplorerError::validation(
            "Missing 'openapi' or 'swagger' version field",
        )),
    }
}

/// Rewrite a Swagger 2.0 pointer to its OpenAPI 3.0 location
pub fn convert_ref(reference: &str) -> String {
    if let Some(name) = reference.strip_prefix("#/definitions/") {
        format!("#/components/schemas/{}", name)
    } else if let Some(name) = reference.strip_prefix("#/parameters/") {
        format!("#/components/parameters/{}", name)
    } else if let Some(name) = reference.strip_prefix("#/responses/") {
        format!("#/components/responses/{}", name)
    } else {
        reference.to_string()
    }
}

/// Stateless Swagger 2.0 → OpenAPI 3.0 converter
pub struct Swagger2Converter;

impl Swagger2Converter {
    /// Convert a raw Swagger 2.0 document
    pub fn convert(mut value: Value) -> Result<Value> {
        // YAML `swagger: 2.0` arrives as a number
        if let Some(Value::Number(n)) = value.get("swagger").cloned() {
            value["swagger"] = json!(format!("{:.1}", n.as_f64().unwrap_or(2.0)));
        }
        let spec: Swagger2Spec = serde_json::from_value(value).map_err(|e| {
            ExplorerError::validation(format!("Failed to parse Swagger 2.0 specification: {}", e))
        })?;
        info!(
            swagger = spec.swagger.as_str(),
            paths = spec.paths.len(),
            "Converting Swagger 2.0 document to OpenAPI 3.0"
        );
        Ok(Self::convert_spec(&spec))
    }

    /// Convert an already-deserialised Swagger 2.0 document
    pub fn convert_spec(spec: &Swagger2Spec) -> Value {
        let mut root = Map::new();
        root.insert("openapi".to_string(), json!("3.0.0"));
        root.insert("info".to_string(), Self::convert_info(&spec.info));

        if spec.host.is_some() || spec.base_path.is_some() {
            let scheme = spec
                .schemes
                .as_ref()
                .and_then(|s| s.first())
                .map(String::as_str)
                .unwrap_or("https");
            let host = spec.host.as_deref().unwrap_or("localhost");
            let base_path = spec.base_path.as_deref().unwrap_or("");
            root.insert(
                "servers".to_string(),
                json!([{ "url": format!("{}://{}{}", scheme, host, base_path) }]),
            );
        }

        let mut paths = Map::new();
        for (path, item) in &spec.paths {
            paths.insert(path.clone(), Self::convert_path_item(item));
        }
        root.insert("paths".to_string(), Value::Object(paths));

        let components = Self::convert_components(spec);
        if !components.is_empty() {
            root.insert("components".to_string(), Value::Object(components));
        }

        if let Some(security) = &spec.security {
            root.insert("security".to_string(), security.clone());
        }
        if let Some(tags) = &spec.tags {
            root.insert("tags".to_string(), tags.clone());
        }
        if let Some(docs) = &spec.external_docs {
            root.insert("externalDocs".to_string(), docs.clone());
        }

        Value::Object(root)
    }

    fn convert_info(info: &Swagger2Info) -> Value {
        let mut out = Map::new();
        out.insert(
            "title".to_string(),
            json!(info.title.clone().unwrap_or_else(|| "API".to_string())),
        );
        out.insert(
            "version".to_string(),
            json!(info.version.clone().unwrap_or_else(|| "1.0.0".to_string())),
        );
        if let Some(description) = &info.description {
            out.insert("description".to_string(), json!(description));
        }
        if let Some(terms) = &info.terms_of_service {
            out.insert("termsOfService".to_string(), json!(terms));
        }
        if let Some(contact) = &info.contact {
            out.insert("contact".to_string(), contact.clone());
        }
        if let Some(license) = &info.license {
            out.insert("license".to_string(), license.clone());
        }
        Value::Object(out)
    }

    fn convert_path_item(item: &Swagger2PathItem) -> Value {
        let mut out = Map::new();
        if let Some(params) = &item.parameters {
            let converted: Vec<Value> = params
                .iter()
                .filter_map(|p| match p {
                    Swagger2ParameterOrRef::Item(param)
                        if param.location == "body" || param.location == "formData" =>
                    {
                        debug!(name = param.name.as_str(), "Skipping path-level body parameter");
                        None
                    }
                    other => Some(Self::convert_parameter_entry(other)),
                })
                .collect();
            if !converted.is_empty() {
                out.insert("parameters".to_string(), Value::Array(converted));
            }
        }
        for (method, operation) in item.operations() {
            if let Some(op) = operation {
                out.insert(method.to_string(), Self::convert_operation(op));
            }
        }
        Value::Object(out)
    }

    fn convert_operation(op: &Swagger2Operation) -> Value {
        let mut out = Map::new();
        if let Some(id) = &op.operation_id {
            out.insert("operationId".to_string(), json!(id));
        }
        if let Some(summary) = &op.summary {
            out.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = &op.description {
            out.insert("description".to_string(), json!(description));
        }
        if let Some(tags) = &op.tags {
            out.insert("tags".to_string(), json!(tags));
        }

        let mut parameters = Vec::new();
        let mut request_body: Option<Value> = None;
        let mut form_properties = Map::new();
        let mut form_required: Vec<String> = Vec::new();

        for entry in op.parameters.iter().flatten() {
            match entry {
                Swagger2ParameterOrRef::Item(param) if param.location == "body" => {
                    let schema = param
                        .schema
                        .as_deref()
                        .map(Self::convert_schema)
                        .unwrap_or_else(|| json!({ "type": "object" }));
                    let mut body = Map::new();
                    if let Some(description) = &param.description {
                        body.insert("description".to_string(), json!(description));
                    }
                    body.insert("required".to_string(), json!(param.required.unwrap_or(false)));
                    body.insert(
                        "content".to_string(),
                        json!({ "application/json": { "schema": schema } }),
                    );
                    request_body = Some(Value::Object(body));
                }
                Swagger2ParameterOrRef::Item(param) if param.location == "formData" => {
                    form_properties.insert(param.name.clone(), Self::parameter_schema(param));
                    if param.required.unwrap_or(false) {
                        form_required.push(param.name.clone());
                    }
                }
                other => parameters.push(Self::convert_parameter_entry(other)),
            }
        }

        if !parameters.is_empty() {
            out.insert("parameters".to_string(), Value::Array(parameters));
        }

        if request_body.is_none() && !form_properties.is_empty() {
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!("object"));
            schema.insert("properties".to_string(), Value::Object(form_properties));
            if !form_required.is_empty() {
                schema.insert("required".to_string(), json!(form_required));
            }
            request_body = Some(json!({
                "content": {
                    "application/x-www-form-urlencoded": { "schema": Value::Object(schema) }
                }
            }));
        }
        if let Some(body) = request_body {
            out.insert("requestBody".to_string(), body);
        }

        let mut responses = Map::new();
        for (status, response) in &op.responses {
            responses.insert(status.clone(), Self::convert_response_entry(response));
        }
        out.insert("responses".to_string(), Value::Object(responses));

        if let Some(security) = &op.security {
            out.insert("security".to_string(), security.clone());
        }
        if op.deprecated.unwrap_or(false) {
            out.insert("deprecated".to_string(), json!(true));
        }

        Value::Object(out)
    }

    fn convert_parameter_entry(entry: &Swagger2ParameterOrRef) -> Value {
        match entry {
            Swagger2ParameterOrRef::Ref { reference } => json!({ "$ref": convert_ref(reference) }),
            Swagger2ParameterOrRef::Item(param) => Self::convert_parameter(param),
        }
    }

    /// Convert a non-body parameter
    fn convert_parameter(param: &Swagger2Parameter) -> Value {
        let mut out = Map::new();
        out.insert("name".to_string(), json!(param.name));
        out.insert("in".to_string(), json!(param.location));
        if let Some(description) = &param.description {
            out.insert("description".to_string(), json!(description));
        }
        let required = param.location == "path" || param.required.unwrap_or(false);
        if required {
            out.insert("required".to_string(), json!(true));
        }
        out.insert("schema".to_string(), Self::parameter_schema(param));
        if let Some(example) = &param.example {
            out.insert("example".to_string(), example.clone());
        }
        Value::Object(out)
    }

    /// Build the schema of a parameter from its inline `schema` or its
    /// `type`/`format`/constraint fields.
    fn parameter_schema(param: &Swagger2Parameter) -> Value {
        if let Some(schema) = &param.schema {
            return Self::convert_schema(schema);
        }

        let mut schema = Map::new();
        match param.param_type.as_deref() {
            Some("file") => {
                schema.insert("type".to_string(), json!("string"));
                schema.insert("format".to_string(), json!("binary"));
            }
            Some(t) => {
                schema.insert("type".to_string(), json!(t));
            }
            None => {
                schema.insert("type".to_string(), json!("string"));
            }
        }
        if let Some(format) = &param.format {
            schema.entry("format").or_insert_with(|| json!(format));
        }
        if let Some(description) = &param.description {
            schema.insert("description".to_string(), json!(description));
        }
        if let Some(items) = &param.items {
            schema.insert("items".to_string(), Self::convert_schema(items));
        }
        if let Some(default) = &param.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(values) = &param.enumeration {
            schema.insert("enum".to_string(), json!(values));
        }
        let constraints = [
            ("minimum", &param.minimum),
            ("maximum", &param.maximum),
            ("minLength", &param.min_length),
            ("maxLength", &param.max_length),
        ];
        for (key, value) in constraints {
            if let Some(v) = value {
                schema.insert(key.to_string(), v.clone());
            }
        }
        if let Some(pattern) = &param.pattern {
            schema.insert("pattern".to_string(), json!(pattern));
        }
        Value::Object(schema)
    }

    fn convert_response_entry(entry: &Swagger2ResponseOrRef) -> Value {
        match entry {
            Swagger2ResponseOrRef::Ref { reference } => json!({ "$ref": convert_ref(reference) }),
            Swagger2ResponseOrRef::Item(response) => Self::convert_response(response),
        }
    }

    fn convert_response(response: &Swagger2Response) -> Value {
        let mut out = Map::new();
        out.insert("description".to_string(), json!(response.description));
        if let Some(headers) = &response.headers {
            out.insert("headers".to_string(), headers.clone());
        }

        let mut content = Map::new();
        if let Some(schema) = &response.schema {
            content.insert(
                "application/json".to_string(),
                json!({ "schema": Self::convert_schema(schema) }),
            );
        }
        for (mime, example) in response.examples.iter().flatten() {
            let media = content.entry(mime.clone()).or_insert_with(|| json!({}));
            if let Some(obj) = media.as_object_mut() {
                obj.insert("example".to_string(), example.clone());
            }
        }
        if !content.is_empty() {
            out.insert("content".to_string(), Value::Object(content));
        }
        Value::Object(out)
    }

    /// Convert a Swagger 2.0 schema, rewriting `#/definitions/` pointers
    pub fn convert_schema(schema: &Swagger2Schema) -> Value {
        if let Some(reference) = &schema.reference {
            return json!({ "$ref": convert_ref(reference) });
        }

        let mut out = Map::new();
        match &schema.schema_type {
            Some(Value::String(t)) if t == "file" => {
                out.insert("type".to_string(), json!("string"));
                out.insert("format".to_string(), json!("binary"));
            }
            Some(t) => {
                out.insert("type".to_string(), t.clone());
            }
            None => {}
        }
        if let Some(format) = &schema.format {
            out.entry("format").or_insert_with(|| json!(format));
        }
        if let Some(title) = &schema.title {
            out.insert("title".to_string(), json!(title));
        }
        if let Some(description) = &schema.description {
            out.insert("description".to_string(), json!(description));
        }
        if let Some(properties) = &schema.properties {
            let converted: Map<String, Value> = properties
                .iter()
                .map(|(name, prop)| (name.clone(), Self::convert_schema(prop)))
                .collect();
            out.insert("properties".to_string(), Value::Object(converted));
        }
        if let Some(items) = &schema.items {
            out.insert("items".to_string(), Self::convert_schema(items));
        }
        if let Some(all_of) = &schema.all_of {
            let converted: Vec<Value> = all_of.iter().map(Self::convert_schema).collect();
            out.insert("allOf".to_string(), Value::Array(converted));
        }
        if let Some(additional) = &schema.additional_properties {
            let converted = match serde_json::from_value::<Swagger2Schema>(additional.clone()) {
                Ok(nested) if additional.is_object() => Self::convert_schema(&nested),
                _ => additional.clone(),
            };
            out.insert("additionalProperties".to_string(), converted);
        }
        if let Some(required) = &schema.required {
            out.insert("required".to_string(), json!(required));
        }
        if let Some(values) = &schema.enumeration {
            out.insert("enum".to_string(), json!(values));
        }
        if let Some(default) = &schema.default {
            out.insert("default".to_string(), default.clone());
        }
        if let Some(example) = &schema.example {
            out.insert("example".to_string(), example.clone());
        }
        if schema.nullable.unwrap_or(false) {
            out.insert("nullable".to_string(), json!(true));
        }
        for (key, value) in &schema.extensions {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(out)
    }

    fn convert_components(spec: &Swagger2Spec) -> Map<String, Value> {
        let mut components = Map::new();

        if let Some(definitions) = &spec.definitions {
            let schemas: Map<String, Value> = definitions
                .iter()
                .map(|(name, schema)| (name.clone(), Self::convert_schema(schema)))
                .collect();
            components.insert("schemas".to_string(), Value::Object(schemas));
        }

        if let Some(parameters) = &spec.parameters {
            let converted: Map<String, Value> = parameters
                .iter()
                .filter(|(_, p)| p.location != "body" && p.location != "formData")
                .map(|(name, p)| (name.clone(), Self::convert_parameter(p)))
                .collect();
            if !converted.is_empty() {
                components.insert("parameters".to_string(), Value::Object(converted));
            }
        }

        if let Some(responses) = &spec.responses {
            let converted: Map<String, Value> = responses
                .iter()
                .map(|(name, r)| (name.clone(), Self::convert_response(r)))
                .collect();
            components.insert("responses".to_string(), Value::Object(converted));
        }

        if let Some(definitions) = &spec.security_definitions {
            let converted: Map<String, Value> = definitions
                .iter()
                .map(|(name, s)| (name.clone(), Self::convert_security_scheme(s)))
                .collect();
            components.insert("securitySchemes".to_string(), Value::Object(converted));
        }

        components
    }

    fn convert_security_scheme(scheme: &Swagger2SecurityScheme) -> Value {
        let mut out = Map::new();
        match scheme.scheme_type.as_str() {
            "basic" => {
                out.insert("type".to_string(), json!("http"));
                out.insert("scheme".to_string(), json!("basic"));
            }
            "apiKey" => {
                out.insert("type".to_string(), json!("apiKey"));
                if let Some(name) = &scheme.name {
                    out.insert("name".to_string(), json!(name));
                }
                if let Some(location) = &scheme.location {
                    out.insert("in".to_string(), json!(location));
                }
            }
            "oauth2" => {
                out.insert("type".to_string(), json!("oauth2"));
                let flow_name = match scheme.flow.as_deref() {
                    Some("password") => "password",
                    Some("application") => "clientCredentials",
                    Some("accessCode") => "authorizationCode",
                    _ => "implicit",
                };
                let mut flow = Map::new();
                if let Some(url) = &scheme.authorization_url {
                    flow.insert("authorizationUrl".to_string(), json!(url));
                }
                if let Some(url) = &scheme.token_url {
                    flow.insert("tokenUrl".to_string(), json!(url));
                }
                flow.insert(
                    "scopes".to_string(),
                    json!(scheme.scopes.clone().unwrap_or_default()),
                );
                out.insert("flows".to_string(), json!({ flow_name: Value::Object(flow) }));
            }
            other => {
                out.insert("type".to_string(), json!(other));
            }
        }
        if let Some(description) = &scheme.description {
            out.insert("description".to_string(), json!(description));
        }
        Value::Object(out)
    }
}

// Include Swagger 2.0 conversion tests
#[cfg(test)]
mod swagger2_tests;
