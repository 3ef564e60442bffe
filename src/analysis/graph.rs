//! Schema graph analysis
//!
//! Dependency tracing (forward and backward), dependency trees with cycle
//! markers, and unused-schema detection. Every traversal carries a
//! [`RefGuard`], so a name is followed at most once per path and the depth
//! budget bounds the walk even on cyclic graphs.

use crate::error::{ExplorerError, Result};
use crate::spec::{collect_value_references, RefGuard, SchemaNode, SpecDocument, Stop};
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which side of the graph to trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceDirection {
    Dependencies,
    Dependents,
    Both,
}

impl TraceDirection {
    fn includes_dependencies(&self) -> bool {
        matches!(self, TraceDirection::Dependencies | TraceDirection::Both)
    }

    fn includes_dependents(&self) -> bool {
        matches!(self, TraceDirection::Dependents | TraceDirection::Both)
    }
}

impl FromStr for TraceDirection {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dependencies" => Ok(TraceDirection::Dependencies),
            "dependents" => Ok(TraceDirection::Dependents),
            "both" => Ok(TraceDirection::Both),
            _ => Err(ExplorerError::unsupported_option(
                "direction",
                s,
                &["dependencies", "dependents", "both"],
            )),
        }
    }
}

impl fmt::Display for TraceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceDirection::Dependencies => "dependencies",
            TraceDirection::Dependents => "dependents",
            TraceDirection::Both => "both",
        };
        f.write_str(name)
    }
}

/// Recursive dependency tree; revisited names become `circular` leaves
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyTree {
    pub name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub circular: bool,
    /// The reference points at a schema that does not exist
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub missing: bool,
    /// The depth budget ran out before this node's references were expanded
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyTree>,
}

impl DependencyTree {
    fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            circular: false,
            missing: false,
            truncated: false,
            dependencies: Vec::new(),
        }
    }

    /// Whether any node in the tree is a circular leaf
    pub fn has_cycle(&self) -> bool {
        self.circular || self.dependencies.iter().any(DependencyTree::has_cycle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub schema_name: String,
    pub direction: TraceDirection,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<DependencyTree>,
    /// Names at which a traversal path closed back on itself
    pub circular_references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedSchemaReport {
    pub total: usize,
    pub used: Vec<String>,
    pub unused: Vec<String>,
    pub usage_percentage: u32,
    /// Referenced names with no matching component schema
    pub unresolved_references: Vec<String>,
    pub include_indirect_references: bool,
}

/// Read-only graph queries over a document's component schemas
pub struct SchemaGraph<'a> {
    doc: &'a SpecDocument,
}

impl<'a> SchemaGraph<'a> {
    pub fn new(doc: &'a SpecDocument) -> Self {
        Self { doc }
    }

    fn require(&self, name: &str) -> Result<&'a SchemaNode> {
        self.doc
            .schema(name)
            .ok_or_else(|| ExplorerError::not_found("Schema", name))
    }

    /// Names transitively reachable from `name`, excluding `name` itself
    pub fn dependency_closure(&self, name: &str, depth: usize) -> Result<IndexSet<String>> {
        let node = self.require(name)?;
        let mut closure = IndexSet::new();
        let mut cycles = IndexSet::new();
        self.collect_dependencies(node, &RefGuard::rooted(name, depth), &mut closure, &mut cycles);
        closure.shift_remove(name);
        Ok(closure)
    }

    fn collect_dependencies(
        &self,
        node: &SchemaNode,
        guard: &RefGuard,
        closure: &mut IndexSet<String>,
        cycles: &mut IndexSet<String>,
    ) {
        for reference in node.references() {
            match guard.enter(&reference) {
                Ok(child) => {
                    if let Some(target) = self.doc.schema(&reference) {
                        closure.insert(reference.clone());
                        self.collect_dependencies(target, &child, closure, cycles);
                    } else {
                        debug!(schema = reference.as_str(), "Dependency points at a missing schema");
                    }
                }
                Err(Stop::Circular) => {
                    cycles.insert(reference.clone());
                    closure.insert(reference);
                }
                Err(Stop::DepthExhausted) => {}
            }
        }
    }

    /// Other schemas whose dependency closure contains `name`
    pub fn dependents(&self, name: &str, depth: usize) -> Result<Vec<String>> {
        self.require(name)?;
        let mut dependents = Vec::new();
        for other in self.doc.schemas().keys() {
            if other == name {
                continue;
            }
            if self.dependency_closure(other, depth)?.contains(name) {
                dependents.push(other.clone());
            }
        }
        Ok(dependents)
    }

    pub fn dependency_tree(&self, name: &str, depth: usize) -> Result<DependencyTree> {
        let node = self.require(name)?;
        let mut tree = DependencyTree::leaf(name);
        tree.dependencies = self.subtrees(node, &RefGuard::rooted(name, depth));
        Ok(tree)
    }

    fn subtrees(&self, node: &SchemaNode, guard: &RefGuard) -> Vec<DependencyTree> {
        node.references()
            .into_iter()
            .map(|reference| {
                let mut tree = DependencyTree::leaf(&reference);
                match guard.enter(&reference) {
                    Ok(child) => match self.doc.schema(&reference) {
                        Some(target) => tree.dependencies = self.subtrees(target, &child),
                        None => tree.missing = true,
                    },
                    Err(Stop::Circular) => tree.circular = true,
                    Err(Stop::DepthExhausted) => {
                        tree.truncated = !self
                            .doc
                            .schema(&reference)
                            .map(|t| t.references().is_empty())
                            .unwrap_or(true);
                    }
                }
                tree
            })
            .collect()
    }

    /// Trace a schema's dependencies and/or dependents
    pub fn trace(&self, name: &str, direction: TraceDirection, depth: usize) -> Result<DependencyReport> {
        let node = self.require(name)?;

        let mut report = DependencyReport {
            schema_name: name.to_string(),
            direction,
            depth,
            dependencies: None,
            dependents: None,
            tree: None,
            circular_references: Vec::new(),
        };

        if direction.includes_dependencies() {
            let mut closure = IndexSet::new();
            let mut cycles = IndexSet::new();
            self.collect_dependencies(node, &RefGuard::rooted(name, depth), &mut closure, &mut cycles);
            closure.shift_remove(name);
            report.dependencies = Some(closure.into_iter().collect());
            report.circular_references = cycles.into_iter().collect();
            report.tree = Some(self.dependency_tree(name, depth)?);
        }

        if direction.includes_dependents() {
            report.dependents = Some(self.dependents(name, depth)?);
        }

        debug!(
            schema = name,
            direction = %direction,
            depth,
            "Traced schema dependencies"
        );
        Ok(report)
    }

    /// Schemas never referenced from `paths` or `components` of `source`, the
    /// normalized document value this graph was built from. Scanning the raw
    /// value keeps references in keys the typed model does not carry
    /// (parameter `content`, callbacks, links). With `include_indirect`, the
    /// bodies of newly found schemas are rescanned until nothing new appears.
    pub fn find_unused(&self, source: &Value, include_indirect: bool) -> UnusedSchemaReport {
        let mut referenced = IndexSet::new();
        collect_value_references(&source["paths"], &mut referenced);
        collect_value_references(&source["components"], &mut referenced);

        if include_indirect {
            let bodies = &source["components"]["schemas"];
            let mut queue: VecDeque<String> = referenced.iter().cloned().collect();
            while let Some(name) = queue.pop_front() {
                let mut found = IndexSet::new();
                collect_value_references(&bodies[name.as_str()], &mut found);
                for reference in found {
                    if referenced.insert(reference.clone()) {
                        queue.push_back(reference);
                    }
                }
            }
        }

        let all = self.doc.schemas();
        let (used, unused): (Vec<String>, Vec<String>) = all
            .keys()
            .cloned()
            .partition(|name| referenced.contains(name));
        let unresolved_references = referenced
            .iter()
            .filter(|name| !all.contains_key(*name))
            .cloned()
            .collect();

        let usage_percentage = if all.is_empty() {
            100
        } else {
            (used.len() as f64 / all.len() as f64 * 100.0).round() as u32
        };

        UnusedSchemaReport {
            total: all.len(),
            used,
            unused,
            usage_percentage,
            unresolved_references,
            include_indirect_references: include_indirect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> SpecDocument {
        serde_json::from_value(value).unwrap()
    }

    fn chain_doc() -> SpecDocument {
        doc(chain_value())
    }

    fn chain_value() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/orders": {"get": {"responses": {"200": {"description": "ok", "content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/Order"}}
                }}}}}
            },
            "components": {"schemas": {
                "Order": {"type": "object", "properties": {
                    "customer": {"$ref": "#/components/schemas/Customer"},
                    "lines": {"type": "array", "items": {"$ref": "#/components/schemas/Line"}}
                }},
                "Customer": {"type": "object", "properties": {"address": {"$ref": "#/components/schemas/Address"}}},
                "Address": {"type": "object"},
                "Line": {"type": "object"},
                "Orphan": {"type": "object"}
            }}
        })
    }

    #[test]
    fn test_dependency_closure_respects_depth() {
        let d = chain_doc();
        let graph = SchemaGraph::new(&d);
        let direct: Vec<String> = graph.dependency_closure("Order", 1).unwrap().into_iter().collect();
        assert_eq!(direct, vec!["Customer", "Line"]);
        let all: Vec<String> = graph.dependency_closure("Order", 5).unwrap().into_iter().collect();
        assert_eq!(all, vec!["Customer", "Address", "Line"]);
    }

    #[test]
    fn test_dependents() {
        let d = chain_doc();
        let graph = SchemaGraph::new(&d);
        assert_eq!(graph.dependents("Address", 5).unwrap(), vec!["Order", "Customer"]);
        assert!(graph.dependents("Order", 5).unwrap().is_empty());
    }

    #[test]
    fn test_trace_unknown_schema_is_not_found() {
        let d = chain_doc();
        let err = SchemaGraph::new(&d)
            .trace("Nope", TraceDirection::Both, 5)
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn test_self_reference_marks_circular_leaf() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "components": {"schemas": {
                "Node": {"type": "object", "properties": {
                    "children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}
                }}
            }}
        }));
        let report = SchemaGraph::new(&d)
            .trace("Node", TraceDirection::Both, 5)
            .unwrap();
        let tree = report.tree.unwrap();
        assert_eq!(tree.dependencies.len(), 1);
        assert!(tree.dependencies[0].circular);
        assert!(tree.dependencies[0].dependencies.is_empty());
        assert_eq!(report.circular_references, vec!["Node"]);
        assert_eq!(report.dependencies, Some(vec![]));
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "components": {"schemas": {
                "A": {"properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }}
        }));
        let graph = SchemaGraph::new(&d);
        let tree = graph.dependency_tree("A", 5).unwrap();
        assert_eq!(tree.dependencies[0].name, "B");
        assert!(tree.dependencies[0].dependencies[0].circular);
        assert!(tree.has_cycle());
        assert_eq!(graph.dependents("A", 5).unwrap(), vec!["B"]);
    }

    #[test]
    fn test_missing_reference_in_tree() {
        let d = doc(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "components": {"schemas": {
                "A": {"properties": {"ghost": {"$ref": "#/components/schemas/Ghost"}}}
            }}
        }));
        let tree = SchemaGraph::new(&d).dependency_tree("A", 5).unwrap();
        assert!(tree.dependencies[0].missing);
        assert!(SchemaGraph::new(&d).dependency_closure("A", 5).unwrap().is_empty());
    }

    #[test]
    fn test_find_unused_with_and_without_indirect() {
        let d = chain_doc();
        let graph = SchemaGraph::new(&d);

        let report = graph.find_unused(&chain_value(), true);
        assert_eq!(report.total, 5);
        assert_eq!(report.unused, vec!["Orphan"]);
        assert_eq!(report.usage_percentage, 80);

        // component schema bodies are part of the first scan
        let report = graph.find_unused(&chain_value(), false);
        assert_eq!(report.used, vec!["Order", "Customer", "Address", "Line"]);
        assert_eq!(report.unused, vec!["Orphan"]);
    }

    #[test]
    fn test_find_unused_sees_keys_outside_typed_model() {
        let source = json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {"/search": {"get": {
                "parameters": [{"name": "filter", "in": "query", "content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/Filter"}}
                }}],
                "callbacks": {"done": {"{$request.body#/url}": {"post": {"requestBody": {"content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/Event"}}
                }}, "responses": {}}}}},
                "responses": {}
            }}},
            "components": {"schemas": {
                "Filter": {"type": "object"},
                "Event": {"type": "object"},
                "Spare": {"type": "object"}
            }}
        });
        let d = doc(source.clone());
        let report = SchemaGraph::new(&d).find_unused(&source, false);
        assert_eq!(report.used, vec!["Filter", "Event"]);
        assert_eq!(report.unused, vec!["Spare"]);
    }

    #[test]
    fn test_find_unused_on_empty_components() {
        let source = json!({"openapi": "3.0.0", "info": {"title": "T", "version": "1"}});
        let d = doc(source.clone());
        let report = SchemaGraph::new(&d).find_unused(&source, true);
        assert_eq!(report.total, 0);
        assert_eq!(report.usage_percentage, 100);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("Both".parse::<TraceDirection>().unwrap(), TraceDirection::Both);
        assert_eq!(
            "sideways".parse::<TraceDirection>().unwrap_err().category(),
            "unsupported_option"
        );
    }
}
