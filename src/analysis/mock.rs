//! Mock data synthesis
//!
//! Generates values shaped like a schema. Output is representative, not
//! reproducible: optional properties, enum picks and numbers are drawn from
//! the injected random source, so tests seed a [`rand::rngs::StdRng`] and
//! assert structure rather than exact values.

use crate::analysis::endpoints::{get_endpoint, EndpointRecord};
use crate::error::{ExplorerError, Result};
use crate::spec::{
    HttpMethod, MediaType, RefGuard, Resolved, Schema, SchemaKind, SchemaNode, SchemaResolver,
    SpecDocument,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Arrays never grow past this many elements
pub const MAX_ARRAY_ITEMS: usize = 5;

/// Upper bound on generated filler strings
pub const MAX_FILLER_LEN: usize = 50;

const FIRST_NAMES: &[&str] = &["Alice", "Bob", "Carla", "Deepak", "Elena", "Femi", "Grace", "Hiro"];
const LAST_NAMES: &[&str] = &["Smith", "Okafor", "Garcia", "Chen", "Novak", "Patel", "Jones"];
const STREETS: &[&str] = &["Main Street", "Oak Avenue", "Harbor Road", "Elm Lane", "Hill Drive"];
const LOREM: &str = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";

/// Which body of an endpoint to mock
#[derive(Debug, Clone, PartialEq)]
pub enum BodyTarget {
    Request,
    /// A response; `None` picks the first 2xx status, else the first declared one
    Response(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockTarget {
    Schema(String),
    Endpoint {
        method: HttpMethod,
        path: String,
        body: BodyTarget,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResult {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub count: usize,
    pub realistic: bool,
    pub values: Vec<Value>,
}

/// Options shared by every value of one request
#[derive(Debug, Clone)]
pub struct MockOptions {
    pub count: usize,
    pub realistic: bool,
    pub optional_property_probability: f64,
    pub max_depth: usize,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            count: 1,
            realistic: true,
            optional_property_probability: 0.7,
            max_depth: crate::spec::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Schema-directed value generator over an injected random source
pub struct MockGenerator<'a, R: Rng> {
    resolver: SchemaResolver<'a>,
    rng: R,
    realistic: bool,
    optional_probability: f64,
    array_len: usize,
    max_depth: usize,
}

impl<'a, R: Rng> MockGenerator<'a, R> {
    pub fn new(doc: &'a SpecDocument, rng: R, options: &MockOptions) -> Self {
        Self {
            resolver: SchemaResolver::new(doc.schemas()),
            rng,
            realistic: options.realistic,
            optional_probability: options.optional_property_probability.clamp(0.0, 1.0),
            array_len: options.count.clamp(1, MAX_ARRAY_ITEMS),
            max_depth: options.max_depth,
        }
    }

    /// Generate one value for `node`
    pub fn generate(&mut self, node: &SchemaNode) -> Value {
        let guard = RefGuard::new(self.max_depth);
        self.value(node, None, &guard)
    }

    fn value(&mut self, node: &SchemaNode, field: Option<&str>, guard: &RefGuard) -> Value {
        match self.resolver.follow(node, guard) {
            Resolved::Schema(schema, guard) => self.from_schema(schema, field, &guard),
            Resolved::Missing(_) => Value::Null,
            // Cut cycles with an empty container of the right shape
            Resolved::Stopped(name, _) => match self.resolver.lookup(name) {
                Some(target) if self.resolver.resolve(target).kind() == SchemaKind::Object => {
                    Value::Object(Map::new())
                }
                Some(target) if self.resolver.resolve(target).kind() == SchemaKind::Array => {
                    Value::Array(Vec::new())
                }
                _ => Value::Null,
            },
        }
    }

    fn from_schema(&mut self, schema: &Schema, field: Option<&str>, guard: &RefGuard) -> Value {
        if let Some(example) = &schema.example {
            return example.clone();
        }
        if let Some(values) = schema.enumeration.as_ref().filter(|v| !v.is_empty()) {
            return values.choose(&mut self.rng).cloned().unwrap_or(Value::Null);
        }
        if let Some(default) = &schema.default {
            return default.clone();
        }

        if !schema.all_of.is_empty() {
            return self.merge_all_of(schema, field, guard);
        }
        let alternatives = if schema.one_of.is_empty() { &schema.any_of } else { &schema.one_of };
        if !alternatives.is_empty() {
            let index = self.rng.gen_range(0..alternatives.len());
            return self.value(&alternatives[index], field, guard);
        }

        match schema.effective_type() {
            Some("string") => Value::String(self.string(schema, field)),
            Some("integer") => self.number(schema, true),
            Some("number") => self.number(schema, false),
            Some("boolean") => Value::Bool(self.rng.gen_bool(0.5)),
            Some("array") => self.array(schema, guard),
            Some("object") => self.object(schema, guard),
            _ => Value::Null,
        }
    }

    fn merge_all_of(&mut self, schema: &Schema, field: Option<&str>, guard: &RefGuard) -> Value {
        let mut merged = Map::new();
        for member in &schema.all_of {
            match self.value(member, field, guard) {
                Value::Object(map) => merged.extend(map),
                other if merged.is_empty() && schema.all_of.len() == 1 => return other,
                _ => {}
            }
        }
        if !schema.properties.is_empty() {
            if let Value::Object(own) = self.object(schema, guard) {
                merged.extend(own);
            }
        }
        Value::Object(merged)
    }

    fn object(&mut self, schema: &Schema, guard: &RefGuard) -> Value {
        let mut map = Map::new();
        for (name, prop) in &schema.properties {
            let include = schema.is_required(name) || self.rng.gen_bool(self.optional_probability);
            if include {
                let value = self.value(prop, Some(name), guard);
                map.insert(name.clone(), value);
            }
        }
        Value::Object(map)
    }

    fn array(&mut self, schema: &Schema, guard: &RefGuard) -> Value {
        let Some(items) = &schema.items else {
            return Value::Array(Vec::new());
        };
        // minItems is honoured only up to the cap
        let mut len = self.array_len;
        if let Some(min) = schema.min_items {
            len = len.max(usize::try_from(min).unwrap_or(usize::MAX)).min(MAX_ARRAY_ITEMS);
        }
        if let Some(max) = schema.max_items {
            len = len.min(usize::try_from(max).unwrap_or(usize::MAX));
        }
        Value::Array((0..len).map(|_| self.value(items, None, guard)).collect())
    }

    fn number(&mut self, schema: &Schema, integer: bool) -> Value {
        let min = schema.minimum.unwrap_or(0.0);
        let max = schema.maximum.unwrap_or(if min > 100.0 { min + 100.0 } else { 100.0 });
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let raw = if low == high {
            low
        } else if (high - low).is_finite() {
            self.rng.gen_range(low..=high)
        } else {
            // The span overflows f64; interpolate over half-bounds instead
            let step = self.rng.gen::<f64>() * (high / 2.0 - low / 2.0);
            (low + step + step).clamp(low, high)
        };

        if integer {
            Value::from(raw.trunc() as i64)
        } else {
            let rounded = (raw * 100.0).round() / 100.0;
            Number::from_f64(if rounded.is_finite() { rounded } else { raw })
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(0))
        }
    }

    fn string(&mut self, schema: &Schema, field: Option<&str>) -> String {
        if let Some(formatted) = schema.format.as_deref().and_then(|f| self.formatted(f)) {
            return formatted;
        }
        if self.realistic {
            if let Some(value) = field.and_then(|f| self.by_field_name(f)) {
                return value;
            }
        }
        self.filler(schema)
    }

    fn formatted(&mut self, format: &str) -> Option<String> {
        let value = match format {
            "email" => self.email(),
            "uri" | "url" => self.url(),
            "date" => self.date(),
            "date-time" => {
                let seconds: u32 = self.rng.gen_range(0..86_400);
                format!(
                    "{}T{:02}:{:02}:{:02}Z",
                    self.date(),
                    seconds / 3600,
                    seconds / 60 % 60,
                    seconds % 60
                )
            }
            "uuid" => uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string(),
            "byte" => {
                let bytes: [u8; 12] = self.rng.gen();
                general_purpose::STANDARD.encode(bytes)
            }
            _ => return None,
        };
        Some(value)
    }

    fn by_field_name(&mut self, field: &str) -> Option<String> {
        let lower = field.to_lowercase();
        let value = if lower.contains("email") {
            self.email()
        } else if lower.contains("phone") {
            format!("+1-555-{:03}-{:04}", self.rng.gen_range(100..1000), self.rng.gen_range(0..10_000))
        } else if lower.contains("address") {
            format!("{} {}", self.rng.gen_range(1..2000), self.pick(STREETS))
        } else if lower.contains("url") || lower.contains("website") {
            self.url()
        } else if lower.contains("name") {
            format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
        } else if lower == "id" || lower.ends_with("_id") || field.ends_with("Id") {
            format!("id_{}", self.rng.gen_range(1000..100_000))
        } else {
            return None;
        };
        Some(value)
    }

    fn filler(&mut self, schema: &Schema) -> String {
        let min = (schema.min_length.unwrap_or(1) as usize).min(MAX_FILLER_LEN);
        let cap = (schema.max_length.unwrap_or(20) as usize).min(MAX_FILLER_LEN);
        let len = if min >= cap { min } else { self.rng.gen_range(min..=cap) };
        let offset = self.rng.gen_range(0..LOREM.len());
        LOREM.chars().cycle().skip(offset).take(len).collect()
    }

    fn email(&mut self) -> String {
        format!(
            "{}.{}@example.com",
            self.pick(FIRST_NAMES).to_lowercase(),
            self.pick(LAST_NAMES).to_lowercase()
        )
    }

    fn url(&mut self) -> String {
        format!("https://example.com/resources/{}", self.rng.gen_range(1..10_000))
    }

    /// A day in 2024, as `YYYY-MM-DD`
    fn date(&mut self) -> String {
        let offset = self.rng.gen_range(0..365);
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .map(|base| (base + Duration::days(offset)).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "2024-01-01".to_string())
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or("sample")
    }
}

/// Preferred media type of a body: JSON first, else the first one with a schema
fn pick_media(content: &indexmap::IndexMap<String, MediaType>) -> Option<(&str, &SchemaNode)> {
    content
        .iter()
        .filter_map(|(mime, media)| media.schema.as_ref().map(|s| (mime.as_str(), s)))
        .min_by_key(|(mime, _)| if mime.contains("json") { 0 } else { 1 })
}

fn endpoint_schema<'r>(
    record: &'r EndpointRecord,
    body: &BodyTarget,
) -> Result<(String, &'r str, &'r SchemaNode)> {
    match body {
        BodyTarget::Request => {
            let content = record
                .request_body
                .as_ref()
                .map(|b| &b.content)
                .ok_or_else(|| ExplorerError::not_found("Request body", record.label()))?;
            let (mime, schema) = pick_media(content)
                .ok_or_else(|| ExplorerError::not_found("Request body schema", record.label()))?;
            Ok((format!("{} request", record.label()), mime, schema))
        }
        BodyTarget::Response(status) => {
            let status = match status {
                Some(s) => s.clone(),
                None => record
                    .responses
                    .keys()
                    .find(|s| s.starts_with('2'))
                    .or_else(|| record.responses.keys().next())
                    .cloned()
                    .ok_or_else(|| ExplorerError::not_found("Response", record.label()))?,
            };
            let response = record.responses.get(&status).ok_or_else(|| {
                ExplorerError::not_found("Response", format!("{} {}", record.label(), status))
            })?;
            let (mime, schema) = pick_media(&response.content).ok_or_else(|| {
                ExplorerError::not_found("Response schema", format!("{} {}", record.label(), status))
            })?;
            Ok((format!("{} response {}", record.label(), status), mime, schema))
        }
    }
}

/// Generate `options.count` values for a schema or endpoint body
pub fn generate_mock_with_rng<R: Rng>(
    doc: &SpecDocument,
    records: &[EndpointRecord],
    target: &MockTarget,
    options: &MockOptions,
    rng: R,
) -> Result<MockResult> {
    let reference;
    let (label, media_type, node) = match target {
        MockTarget::Schema(name) => {
            doc.schema(name)
                .ok_or_else(|| ExplorerError::not_found("Schema", name.as_str()))?;
            reference = SchemaNode::reference_to(name);
            (name.clone(), None, &reference)
        }
        MockTarget::Endpoint { method, path, body } => {
            let record = get_endpoint(records, *method, path)?;
            let (label, mime, node) = endpoint_schema(record, body)?;
            (label, Some(mime.to_string()), node)
        }
    };

    let count = options.count.max(1);
    let mut generator = MockGenerator::new(doc, rng, options);
    let values = (0..count).map(|_| generator.generate(node)).collect();

    tracing::debug!(mock_target = label.as_str(), count, "Generated mock data");
    Ok(MockResult {
        target: label,
        media_type,
        count,
        realistic: options.realistic,
        values,
    })
}

/// Generate mock values using the thread-local random source
pub fn generate_mock(
    doc: &SpecDocument,
    records: &[EndpointRecord],
    target: &MockTarget,
    options: &MockOptions,
) -> Result<MockResult> {
    generate_mock_with_rng(doc, records, target, options, rand::thread_rng())
}
