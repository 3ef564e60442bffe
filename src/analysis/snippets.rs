//! Request code examples for an endpoint

use crate::analysis::endpoints::EndpointRecord;
use crate::analysis::mock::{MockGenerator, MockOptions};
use crate::error::{ExplorerError, Result};
use crate::spec::{MediaType, Parameter, SchemaResolver, SpecDocument};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const FALLBACK_BASE_URL: &str = "https://api.example.com";

// Fixed so the same endpoint always renders the same snippet
const SNIPPET_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Curl,
    JavaScript,
    Python,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 3] = [CodeLanguage::Curl, CodeLanguage::JavaScript, CodeLanguage::Python];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Curl => "curl",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::Python => "python",
        }
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeLanguage {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curl" => Ok(CodeLanguage::Curl),
            "javascript" | "js" => Ok(CodeLanguage::JavaScript),
            "python" | "py" => Ok(CodeLanguage::Python),
            _ => Err(ExplorerError::unsupported_option(
                "language",
                s,
                &["curl", "javascript", "python"],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeExample {
    pub language: CodeLanguage,
    pub endpoint: String,
    pub url: String,
    pub code: String,
}

/// Everything a snippet needs, independent of the target language
struct RequestPlan {
    method: &'static str,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

pub fn generate_code_example(
    doc: &SpecDocument,
    record: &EndpointRecord,
    language: CodeLanguage,
) -> CodeExample {
    let plan = plan_request(doc, record);
    let code = match language {
        CodeLanguage::Curl => render_curl(&plan),
        CodeLanguage::JavaScript => render_javascript(&plan),
        CodeLanguage::Python => render_python(&plan),
    };
    CodeExample {
        language,
        endpoint: record.label(),
        url: plan.url,
        code,
    }
}

fn base_url(doc: &SpecDocument) -> String {
    match doc.server_urls().into_iter().next() {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            url.trim_end_matches('/').to_string()
        }
        Some(relative) => format!("{}{}", FALLBACK_BASE_URL, relative.trim_end_matches('/')),
        None => FALLBACK_BASE_URL.to_string(),
    }
}

fn parameter_value(resolver: &SchemaResolver<'_>, param: &Parameter) -> String {
    let value = param.example.clone().or_else(|| {
        let schema = resolver.resolve(param.schema.as_ref()?);
        schema
            .example
            .clone()
            .or_else(|| schema.default.clone())
            .or_else(|| schema.enumeration.as_ref().and_then(|e| e.first().cloned()))
            .or_else(|| match schema.effective_type() {
                Some("integer") | Some("number") => Some(Value::from(1)),
                Some("boolean") => Some(Value::Bool(true)),
                _ => None,
            })
    });
    match value {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => param.name.clone(),
    }
}

fn encode(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

fn json_media(content: &indexmap::IndexMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    content
        .iter()
        .map(|(mime, media)| (mime.as_str(), media))
        .min_by_key(|(mime, _)| if mime.contains("json") { 0 } else { 1 })
}

fn media_example(media: &MediaType) -> Option<Value> {
    media.example.clone().or_else(|| {
        media
            .examples
            .values()
            .next()
            .map(|example| example.get("value").cloned().unwrap_or_else(|| example.clone()))
    })
}

fn plan_request(doc: &SpecDocument, record: &EndpointRecord) -> RequestPlan {
    let resolver = SchemaResolver::new(doc.schemas());

    let mut path = record.path.clone();
    let mut query = Vec::new();
    let mut headers = Vec::new();
    for param in &record.parameters {
        match param.location.as_str() {
            "path" => {
                let value = parameter_value(&resolver, param);
                path = path.replace(&format!("{{{}}}", param.name), &value);
            }
            "query" if param.required => {
                let value = parameter_value(&resolver, param);
                query.push(format!("{}={}", encode(&param.name), encode(&value)));
            }
            "header" if param.required => {
                headers.push((param.name.clone(), parameter_value(&resolver, param)));
            }
            _ => {}
        }
    }

    let mut url = format!("{}{}", base_url(doc), path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    headers.extend(auth_header(doc, record));

    let body = record
        .request_body
        .as_ref()
        .and_then(|b| json_media(&b.content))
        .and_then(|(mime, media)| {
            let value = media_example(media).or_else(|| {
                let options = MockOptions {
                    optional_property_probability: 1.0,
                    ..MockOptions::default()
                };
                let mut generator = MockGenerator::new(doc, StdRng::seed_from_u64(SNIPPET_SEED), &options);
                media.schema.as_ref().map(|schema| generator.generate(schema))
            })?;
            headers.push(("Content-Type".to_string(), mime.to_string()));
            Some(value)
        });

    RequestPlan {
        method: record.method.as_str(),
        url,
        headers,
        body,
    }
}

/// Placeholder credentials for the first scheme the endpoint requires
fn auth_header(doc: &SpecDocument, record: &EndpointRecord) -> Option<(String, String)> {
    let name = record.security.iter().flat_map(|req| req.keys()).next()?;
    let scheme = doc.components.security_schemes.get(name)?;
    match (scheme.scheme_type.as_str(), scheme.scheme.as_deref()) {
        ("http", Some("basic")) => Some(("Authorization".to_string(), "Basic <credentials>".to_string())),
        ("http", _) | ("oauth2", _) | ("openIdConnect", _) => {
            Some(("Authorization".to_string(), "Bearer <token>".to_string()))
        }
        ("apiKey", _) if scheme.location.as_deref() == Some("header") => {
            scheme.name.clone().map(|header| (header, "<api-key>".to_string()))
        }
        _ => None,
    }
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

fn render_curl(plan: &RequestPlan) -> String {
    let mut lines = vec![format!("curl -X {} {}", plan.method, shell_quote(&plan.url))];
    for (name, value) in &plan.headers {
        lines.push(format!("  -H {}", shell_quote(&format!("{}: {}", name, value))));
    }
    if let Some(body) = &plan.body {
        lines.push(format!("  -d {}", shell_quote(&body.to_string())));
    }
    lines.join(" \\\n")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn render_javascript(plan: &RequestPlan) -> String {
    let mut options = vec![format!("  method: \"{}\"", plan.method)];
    if !plan.headers.is_empty() {
        let headers: Vec<String> = plan
            .headers
            .iter()
            .map(|(name, value)| format!("    {}: {}", Value::from(name.as_str()), Value::from(value.as_str())))
            .collect();
        options.push(format!("  headers: {{\n{}\n  }}", headers.join(",\n")));
    }
    if let Some(body) = &plan.body {
        let body = pretty(body).replace('\n', "\n  ");
        options.push(format!("  body: JSON.stringify({})", body));
    }
    format!(
        "const response = await fetch({}, {{\n{}\n}});\nconst data = await response.json();\nconsole.log(data);",
        Value::from(plan.url.as_str()),
        options.join(",\n")
    )
}

/// Render a JSON value as a Python literal
fn python_literal(value: &Value, indent: usize) -> String {
    let pad = "    ".repeat(indent + 1);
    let close = "    ".repeat(indent);
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => Value::from(s.as_str()).to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items
                .iter()
                .map(|item| format!("{}{}", pad, python_literal(item, indent + 1)))
                .collect();
            format!("[\n{}\n{}]", inner.join(",\n"), close)
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}{}: {}", pad, Value::from(k.as_str()), python_literal(v, indent + 1)))
                .collect();
            format!("{{\n{}\n{}}}", inner.join(",\n"), close)
        }
    }
}

fn render_python(plan: &RequestPlan) -> String {
    let mut lines = vec![
        "import requests".to_string(),
        String::new(),
        format!("url = {}", Value::from(plan.url.as_str())),
    ];
    let mut args = vec!["url".to_string()];
    if !plan.headers.is_empty() {
        let headers: Vec<String> = plan
            .headers
            .iter()
            .map(|(name, value)| format!("{}: {}", Value::from(name.as_str()), Value::from(value.as_str())))
            .collect();
        lines.push(format!("headers = {{{}}}", headers.join(", ")));
        args.push("headers=headers".to_string());
    }
    if let Some(body) = &plan.body {
        lines.push(format!("payload = {}", python_literal(body, 0)));
        args.push("json=payload".to_string());
    }
    lines.push(String::new());
    lines.push(format!(
        "response = requests.{}({})",
        plan.method.to_ascii_lowercase(),
        args.join(", ")
    ));
    lines.push("print(response.json())".to_string());
    lines.join("\n")
}
