//! Schema node model
//!
//! A schema position in a document is either a `$ref` pointer or an inline
//! schema. Inline schemas are classified by [`Schema::kind`] and expose their
//! nested positions through [`SchemaNode::children`], which every recursive
//! analysis pass walks.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Prefix of local component schema pointers
pub const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// A schema position: either a reference or an inline schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    /// `{"$ref": "#/components/schemas/Name"}`
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Any other schema object
    Inline(Box<Schema>),
}

/// `additionalProperties` is either a boolean or a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Any(bool),
    Schema(Box<SchemaNode>),
}

/// Inline schema object (OpenAPI 3.0 subset)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_schema_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub write_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Accept `"type": "string"` as well as `"type": ["string", "null"]`
fn deserialize_schema_type<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(String::from),
        _ => None,
    })
}

/// Structural classification of an inline schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Primitive,
    Object,
    Array,
    Composition,
}

/// The edge leading from a schema to one of its nested positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEdge<'a> {
    Property(&'a str),
    Items,
    AdditionalProperties,
    OneOf(usize),
    AnyOf(usize),
    AllOf(usize),
    Not,
}

impl fmt::Display for SchemaEdge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaEdge::Property(name) => write!(f, "{}", name),
            SchemaEdge::Items => write!(f, "[items]"),
            SchemaEdge::AdditionalProperties => write!(f, "additionalProperties"),
            SchemaEdge::OneOf(i) => write!(f, "oneOf[{}]", i),
            SchemaEdge::AnyOf(i) => write!(f, "anyOf[{}]", i),
            SchemaEdge::AllOf(i) => write!(f, "allOf[{}]", i),
            SchemaEdge::Not => write!(f, "not"),
        }
    }
}

/// Extract the schema name (trailing pointer segment) from a `$ref` string
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Build the canonical pointer for a component schema
pub fn schema_ref(name: &str) -> String {
    format!("{}{}", COMPONENT_SCHEMA_PREFIX, name)
}

impl SchemaNode {
    /// Create a reference node pointing at a component schema
    pub fn reference_to(name: &str) -> Self {
        SchemaNode::Reference {
            reference: schema_ref(name),
        }
    }

    /// The raw pointer if this node is a reference
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            SchemaNode::Reference { reference } => Some(reference),
            SchemaNode::Inline(_) => None,
        }
    }

    /// The referenced component name if this node is a reference
    pub fn reference_name(&self) -> Option<&str> {
        self.as_reference().map(ref_name)
    }

    /// The inline schema if this node is not a reference
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaNode::Inline(schema) => Some(schema),
            SchemaNode::Reference { .. } => None,
        }
    }

    /// Nested schema positions of an inline node; references have none
    pub fn children(&self) -> Vec<(SchemaEdge<'_>, &SchemaNode)> {
        match self {
            SchemaNode::Inline(schema) => schema.children(),
            SchemaNode::Reference { .. } => Vec::new(),
        }
    }

    /// Collect every component schema name referenced anywhere inside this
    /// node, without following the references themselves.
    pub fn collect_references(&self, names: &mut IndexSet<String>) {
        match self {
            SchemaNode::Reference { reference } => {
                if reference.starts_with(COMPONENT_SCHEMA_PREFIX) {
                    names.insert(ref_name(reference).to_string());
                }
            }
            SchemaNode::Inline(_) => {
                for (_, child) in self.children() {
                    child.collect_references(names);
                }
            }
        }
    }

    /// Direct references of this node, in discovery order
    pub fn references(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.collect_references(&mut names);
        names
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        SchemaNode::Inline(Box::new(schema))
    }
}

impl Schema {
    /// Shorthand for a schema with only a type
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> SchemaKind {
        if !self.one_of.is_empty() || !self.any_of.is_empty() || !self.all_of.is_empty() {
            return SchemaKind::Composition;
        }
        match self.schema_type.as_deref() {
            Some("array") => SchemaKind::Array,
            Some("object") => SchemaKind::Object,
            Some(_) => SchemaKind::Primitive,
            None if self.items.is_some() => SchemaKind::Array,
            None if !self.properties.is_empty() || self.additional_properties.is_some() => {
                SchemaKind::Object
            }
            None => SchemaKind::Primitive,
        }
    }

    /// Declared type, falling back to the structurally implied one
    pub fn effective_type(&self) -> Option<&str> {
        if let Some(t) = self.schema_type.as_deref() {
            return Some(t);
        }
        match self.kind() {
            SchemaKind::Object => Some("object"),
            SchemaKind::Array => Some("array"),
            _ => None,
        }
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    pub fn has_composition(&self) -> bool {
        self.kind() == SchemaKind::Composition
    }

    pub fn children(&self) -> Vec<(SchemaEdge<'_>, &SchemaNode)> {
        let mut children: Vec<(SchemaEdge<'_>, &SchemaNode)> = self
            .properties
            .iter()
            .map(|(name, node)| (SchemaEdge::Property(name.as_str()), node))
            .collect();
        if let Some(items) = &self.items {
            children.push((SchemaEdge::Items, items));
        }
        if let Some(AdditionalProperties::Schema(node)) = &self.additional_properties {
            children.push((SchemaEdge::AdditionalProperties, node));
        }
        children.extend(self.one_of.iter().enumerate().map(|(i, n)| (SchemaEdge::OneOf(i), n)));
        children.extend(self.any_of.iter().enumerate().map(|(i, n)| (SchemaEdge::AnyOf(i), n)));
        children.extend(self.all_of.iter().enumerate().map(|(i, n)| (SchemaEdge::AllOf(i), n)));
        if let Some(not) = &self.not {
            children.push((SchemaEdge::Not, not));
        }
        children
    }
}

/// Collect component schema names from `$ref` strings anywhere in a raw JSON value
pub fn collect_value_references(value: &Value, names: &mut IndexSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if key == "$ref" {
                    if let Some(reference) = nested.as_str() {
                        if reference.starts_with(COMPONENT_SCHEMA_PREFIX) {
                            names.insert(ref_name(reference).to_string());
                        }
                    }
                } else {
                    collect_value_references(nested, names);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_value_references(item, names);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> SchemaNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reference_deserializes_as_reference_variant() {
        let n = node(json!({"$ref": "#/components/schemas/Pet"}));
        assert_eq!(n.reference_name(), Some("Pet"));
        assert!(n.as_schema().is_none());
    }

    #[test]
    fn test_inline_schema_keeps_property_order() {
        let n = node(json!({
            "type": "object",
            "properties": {"zeta": {"type": "string"}, "alpha": {"type": "integer"}},
            "required": ["zeta"]
        }));
        let schema = n.as_schema().unwrap();
        let names: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(schema.is_required("zeta"));
        assert_eq!(schema.kind(), SchemaKind::Object);
    }

    #[test]
    fn test_type_array_takes_first_non_null() {
        let n = node(json!({"type": ["null", "string"]}));
        assert_eq!(n.as_schema().unwrap().schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(node(json!({"type": "string"})).as_schema().unwrap().kind(), SchemaKind::Primitive);
        assert_eq!(node(json!({"items": {"type": "string"}})).as_schema().unwrap().kind(), SchemaKind::Array);
        assert_eq!(
            node(json!({"oneOf": [{"type": "string"}, {"type": "integer"}]})).as_schema().unwrap().kind(),
            SchemaKind::Composition
        );
    }

    #[test]
    fn test_collect_references_walks_all_edges() {
        let n = node(json!({
            "type": "object",
            "properties": {
                "owner": {"$ref": "#/components/schemas/Owner"},
                "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
            },
            "additionalProperties": {"$ref": "#/components/schemas/Extra"},
            "allOf": [{"$ref": "#/components/schemas/Base"}]
        }));
        let refs: Vec<String> = n.references().into_iter().collect();
        assert_eq!(refs, vec!["Owner", "Tag", "Extra", "Base"]);
    }

    #[test]
    fn test_edge_display_segments() {
        assert_eq!(SchemaEdge::Items.to_string(), "[items]");
        assert_eq!(SchemaEdge::OneOf(2).to_string(), "oneOf[2]");
        assert_eq!(SchemaEdge::Property("name").to_string(), "name");
    }

    #[test]
    fn test_collect_value_references_ignores_other_components() {
        let value = json!({
            "a": {"$ref": "#/components/schemas/A"},
            "b": [{"$ref": "#/components/parameters/Limit"}]
        });
        let mut names = IndexSet::new();
        collect_value_references(&value, &mut names);
        assert_eq!(names.len(), 1);
        assert!(names.contains("A"));
    }
}
