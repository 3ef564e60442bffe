//! Structural validation of literal examples against their schemas
//!
//! Violations are collected as data; a malformed example never aborts the
//! pass. This is a structural check, not JSON Schema validation.

use crate::analysis::endpoints::{get_endpoint, EndpointRecord};
use crate::error::Result;
use crate::spec::{
    ref_name, AdditionalProperties, HttpMethod, MediaType, RefGuard, Resolved, SchemaNode,
    SchemaResolver, SpecDocument,
};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One discrete mismatch between an example and its schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON-path style location, rooted at `$`
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Violation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    fn mismatch(path: &str, message: impl Into<String>, expected: String, actual: String) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            expected: Some(expected),
            actual: Some(actual),
        }
    }
}

/// Result of checking one example
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCheck {
    pub endpoint: String,
    /// `request`, `response <status>` or `parameter <name>`
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub example_name: String,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleValidationReport {
    pub strict_mode: bool,
    pub examples_checked: usize,
    pub valid_examples: usize,
    pub invalid_examples: usize,
    pub results: Vec<ExampleCheck>,
}

impl ExampleValidationReport {
    /// All violations across every checked example
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.results.iter().flat_map(|r| r.violations.iter())
    }
}

/// JSON type name used in messages; integers and floats are both `number`
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_compatible(declared: &str, value: &Value) -> bool {
    match declared {
        "integer" | "number" => value.is_number(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// Validates values against schemas of one document
pub struct ExampleValidator<'a> {
    resolver: SchemaResolver<'a>,
    strict: bool,
}

impl<'a> ExampleValidator<'a> {
    pub fn new(doc: &'a SpecDocument, strict: bool) -> Self {
        Self {
            resolver: SchemaResolver::new(doc.schemas()),
            strict,
        }
    }

    /// Check `value` against `node`, returning every violation found
    pub fn validate(&self, node: &SchemaNode, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check(node, value, "$", &RefGuard::default(), self.strict, &mut violations);
        violations
    }

    fn check(
        &self,
        node: &SchemaNode,
        value: &Value,
        path: &str,
        guard: &RefGuard,
        strict: bool,
        out: &mut Vec<Violation>,
    ) {
        let (schema, guard) = match self.resolver.follow(node, guard) {
            Resolved::Schema(schema, guard) => (schema, guard),
            // Unresolvable or cyclic positions are not checked
            Resolved::Missing(_) | Resolved::Stopped(..) => return,
        };

        if value.is_null() && schema.nullable {
            return;
        }

        if let Some(allowed) = &schema.enumeration {
            if !allowed.contains(value) {
                out.push(Violation::mismatch(
                    path,
                    "Value is not one of the allowed enum values",
                    serde_json::to_string(allowed).unwrap_or_default(),
                    value.to_string(),
                ));
            }
        }

        for member in &schema.all_of {
            self.check(member, value, path, &guard, false, out);
        }
        for (keyword, alternatives) in [("oneOf", &schema.one_of), ("anyOf", &schema.any_of)] {
            if alternatives.is_empty() {
                continue;
            }
            let matched = alternatives.iter().any(|alt| {
                let mut scratch = Vec::new();
                self.check(alt, value, path, &guard, false, &mut scratch);
                scratch.is_empty()
            });
            if !matched {
                out.push(Violation::new(
                    path,
                    format!("Value does not match any {} alternative", keyword),
                ));
            }
        }

        if let Some(declared) = schema.effective_type() {
            if !type_compatible(declared, value) {
                out.push(Violation::mismatch(
                    path,
                    "Type mismatch",
                    declared.to_string(),
                    json_type(value).to_string(),
                ));
                return;
            }
        }

        match value {
            Value::String(s) => {
                let length = s.chars().count() as u64;
                if let Some(min) = schema.min_length {
                    if length < min {
                        out.push(Violation::mismatch(
                            path,
                            "String is shorter than minLength",
                            format!(">= {}", min),
                            length.to_string(),
                        ));
                    }
                }
                if let Some(max) = schema.max_length {
                    if length > max {
                        out.push(Violation::mismatch(
                            path,
                            "String is longer than maxLength",
                            format!("<= {}", max),
                            length.to_string(),
                        ));
                    }
                }
                if let Some(pattern) = &schema.pattern {
                    match Regex::new(pattern) {
                        Ok(re) if !re.is_match(s) => out.push(Violation::mismatch(
                            path,
                            "String does not match pattern",
                            pattern.clone(),
                            s.clone(),
                        )),
                        Ok(_) => {}
                        Err(_) => out.push(Violation::new(
                            path,
                            format!("Schema pattern '{}' is not a valid regular expression", pattern),
                        )),
                    }
                }
            }
            Value::Number(n) => {
                if let Some(x) = n.as_f64() {
                    if let Some(min) = schema.minimum {
                        if x < min {
                            out.push(Violation::mismatch(
                                path,
                                "Number is below minimum",
                                format!(">= {}", min),
                                n.to_string(),
                            ));
                        }
                    }
                    if let Some(max) = schema.maximum {
                        if x > max {
                            out.push(Violation::mismatch(
                                path,
                                "Number is above maximum",
                                format!("<= {}", max),
                                n.to_string(),
                            ));
                        }
                    }
                }
            }
            Value::Object(map) => {
                for required in &schema.required {
                    if !map.contains_key(required) {
                        out.push(Violation::new(
                            &format!("{}.{}", path, required),
                            "Required property is missing",
                        ));
                    }
                }
                let open = matches!(
                    schema.additional_properties,
                    Some(AdditionalProperties::Any(true)) | Some(AdditionalProperties::Schema(_))
                );
                for (key, nested) in map {
                    let nested_path = format!("{}.{}", path, key);
                    match schema.properties.get(key) {
                        Some(prop) => self.check(prop, nested, &nested_path, &guard, strict, out),
                        None => {
                            if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
                                self.check(extra, nested, &nested_path, &guard, strict, out);
                            } else if strict && !open {
                                out.push(Violation::new(
                                    &nested_path,
                                    "Property is not declared in the schema",
                                ));
                            }
                        }
                    }
                }
            }
            Value::Array(items) => {
                let count = items.len() as u64;
                if let Some(min) = schema.min_items {
                    if count < min {
                        out.push(Violation::mismatch(
                            path,
                            "Array has fewer items than minItems",
                            format!(">= {}", min),
                            count.to_string(),
                        ));
                    }
                }
                if let Some(max) = schema.max_items {
                    if count > max {
                        out.push(Violation::mismatch(
                            path,
                            "Array has more items than maxItems",
                            format!("<= {}", max),
                            count.to_string(),
                        ));
                    }
                }
                if let Some(item_schema) = &schema.items {
                    for (i, item) in items.iter().enumerate() {
                        self.check(item_schema, item, &format!("{}[{}]", path, i), &guard, strict, out);
                    }
                }
            }
            Value::Bool(_) | Value::Null => {}
        }
    }
}

/// Named examples of a media type, with component example refs resolved
fn media_examples<'d>(doc: &'d SpecDocument, media: &'d MediaType) -> Vec<(String, &'d Value)> {
    let mut examples = Vec::new();
    if let Some(example) = &media.example {
        examples.push(("example".to_string(), example));
    }
    for (name, entry) in &media.examples {
        let entry = match entry.get("$ref").and_then(Value::as_str) {
            Some(reference) => match doc.components.examples.get(ref_name(reference)) {
                Some(target) => target,
                None => {
                    debug!(reference, "Skipping unresolved example reference");
                    continue;
                }
            },
            None => entry,
        };
        if let Some(value) = entry.get("value") {
            examples.push((name.clone(), value));
        }
    }
    examples
}

fn check_media(
    validator: &ExampleValidator<'_>,
    doc: &SpecDocument,
    record: &EndpointRecord,
    location: String,
    mime: &str,
    media: &MediaType,
    results: &mut Vec<ExampleCheck>,
) {
    let Some(schema) = &media.schema else {
        return;
    };

    let mut push = |name: String, value: &Value| {
        let violations = validator.validate(schema, value);
        results.push(ExampleCheck {
            endpoint: record.label(),
            location: location.clone(),
            media_type: Some(mime.to_string()),
            example_name: name,
            valid: violations.is_empty(),
            violations,
        });
    };

    for (name, value) in media_examples(doc, media) {
        push(name, value);
    }
    if let Some(example) = &validator.resolver.resolve(schema).example {
        push("schema example".to_string(), example);
    }
}

/// Validate every example attached to the selected endpoints
pub fn validate_examples(
    doc: &SpecDocument,
    records: &[EndpointRecord],
    endpoint: Option<(HttpMethod, &str)>,
    strict: bool,
) -> Result<ExampleValidationReport> {
    let selected: Vec<&EndpointRecord> = match endpoint {
        Some((method, path)) => vec![get_endpoint(records, method, path)?],
        None => records.iter().collect(),
    };

    let validator = ExampleValidator::new(doc, strict);
    let mut results = Vec::new();

    for record in selected {
        for param in &record.parameters {
            if let (Some(example), Some(schema)) = (&param.example, &param.schema) {
                let violations = validator.validate(schema, example);
                results.push(ExampleCheck {
                    endpoint: record.label(),
                    location: format!("parameter {}", param.name),
                    media_type: None,
                    example_name: "example".to_string(),
                    valid: violations.is_empty(),
                    violations,
                });
            }
        }
        for (mime, media) in record.request_media() {
            check_media(&validator, doc, record, "request".to_string(), mime, media, &mut results);
        }
        for (status, mime, media) in record.response_media() {
            check_media(
                &validator,
                doc,
                record,
                format!("response {}", status),
                mime,
                media,
                &mut results,
            );
        }
    }

    let valid_examples = results.iter().filter(|r| r.valid).count();
    Ok(ExampleValidationReport {
        strict_mode: strict,
        examples_checked: results.len(),
        valid_examples,
        invalid_examples: results.len() - valid_examples,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::endpoints::extract_endpoints;
    use serde_json::json;

    fn empty_doc() -> SpecDocument {
        serde_json::from_value(json!({"openapi": "3.0.0", "info": {"title": "T", "version": "1"}})).unwrap()
    }

    fn node(value: Value) -> SchemaNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_type_mismatch_is_reported_at_property_path() {
        let doc = empty_doc();
        let schema = node(json!({"type": "object", "properties": {"age": {"type": "number"}}}));
        let violations = ExampleValidator::new(&doc, false).validate(&schema, &json!({"age": "old"}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$.age");
        assert_eq!(violations[0].expected.as_deref(), Some("number"));
        assert_eq!(violations[0].actual.as_deref(), Some("string"));
    }

    #[test]
    fn test_integer_and_number_are_interchangeable() {
        let doc = empty_doc();
        let validator = ExampleValidator::new(&doc, false);
        assert!(validator.validate(&node(json!({"type": "integer"})), &json!(2.5)).is_empty());
        assert!(validator.validate(&node(json!({"type": "number"})), &json!(3)).is_empty());
        assert_eq!(validator.validate(&node(json!({"type": "array"})), &json!({})).len(), 1);
    }

    #[test]
    fn test_string_and_number_constraints() {
        let doc = empty_doc();
        let validator = ExampleValidator::new(&doc, false);
        let schema = node(json!({"type": "string", "minLength": 3, "pattern": "^[a-z]+$", "enum": ["abc", "xyz"]}));
        let violations = validator.validate(&schema, &json!("A1"));
        assert_eq!(violations.len(), 3);

        let bounded = node(json!({"type": "number", "minimum": 1, "maximum": 10}));
        assert_eq!(validator.validate(&bounded, &json!(11)).len(), 1);
        assert!(validator.validate(&bounded, &json!(5)).is_empty());
    }

    #[test]
    fn test_required_and_strict_mode() {
        let doc = empty_doc();
        let schema = node(json!({
            "type": "object",
            "required": ["id"],
            "properties": {"id": {"type": "integer"}}
        }));
        let example = json!({"extra": true});

        let lenient = ExampleValidator::new(&doc, false).validate(&schema, &example);
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient[0].path, "$.id");

        let strict = ExampleValidator::new(&doc, true).validate(&schema, &example);
        assert_eq!(strict.len(), 2);
        assert_eq!(strict[1].path, "$.extra");
    }

    #[test]
    fn test_arrays_recurse_into_items() {
        let doc = empty_doc();
        let schema = node(json!({"type": "array", "maxItems": 2, "items": {"type": "string"}}));
        let violations = ExampleValidator::new(&doc, false).validate(&schema, &json!(["a", 1, "c"]));
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.path == "$[1]"));
    }

    #[test]
    fn test_invalid_schema_pattern_becomes_violation() {
        let doc = empty_doc();
        let schema = node(json!({"type": "string", "pattern": "(["}));
        let violations = ExampleValidator::new(&doc, false).validate(&schema, &json!("x"));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("not a valid regular expression"));
    }

    #[test]
    fn test_one_of_passes_when_any_alternative_matches() {
        let doc = empty_doc();
        let schema = node(json!({"oneOf": [{"type": "string"}, {"type": "integer"}]}));
        let validator = ExampleValidator::new(&doc, false);
        assert!(validator.validate(&schema, &json!(4)).is_empty());
        assert_eq!(validator.validate(&schema, &json!(true)).len(), 1);
    }

    #[test]
    fn test_validate_examples_over_endpoints() {
        let doc: SpecDocument = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}, "example": "ten"}],
                        "responses": {"200": {"description": "ok", "content": {"application/json": {
                            "schema": {"$ref": "#/components/schemas/Pet"},
                            "examples": {
                                "good": {"value": {"name": "Rex"}},
                                "shared": {"$ref": "#/components/examples/BadPet"}
                            }
                        }}}}
                    }
                }
            },
            "components": {
                "schemas": {"Pet": {"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}, "example": {"name": "Tom"}}},
                "examples": {"BadPet": {"value": {"name": 7}}}
            }
        }))
        .unwrap();
        let records = extract_endpoints(&doc);

        let report = validate_examples(&doc, &records, None, false).unwrap();
        assert_eq!(report.examples_checked, 4);
        assert_eq!(report.invalid_examples, 2);
        assert_eq!(report.violations().count(), 2);

        let err = validate_examples(&doc, &records, Some((HttpMethod::Post, "/pets")), false).unwrap_err();
        assert_eq!(err.category(), "not_found");
    }
}
