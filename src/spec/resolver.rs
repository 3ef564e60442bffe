//! Schema reference resolution
//!
//! Resolution is confined to `components.schemas`. A missing target resolves
//! to an empty schema instead of failing, so batch passes can keep going and
//! report what they found.

use crate::spec::schema::{ref_name, Schema, SchemaNode};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::debug;

/// Default remaining-depth budget for reference traversal
pub const DEFAULT_MAX_DEPTH: usize = 5;

static EMPTY_SCHEMA: Lazy<Schema> = Lazy::new(Schema::default);

/// Why a traversal refused to follow a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The name is already on the current traversal path
    Circular,
    /// The depth budget is spent
    DepthExhausted,
}

/// Branch-scoped cycle and depth guard.
///
/// Each call to [`RefGuard::enter`] returns a new guard for the child branch,
/// so sibling branches never see each other's visited names.
#[derive(Debug, Clone)]
pub struct RefGuard {
    visited: Vec<String>,
    remaining_depth: usize,
}

impl RefGuard {
    pub fn new(max_depth: usize) -> Self {
        Self {
            visited: Vec::new(),
            remaining_depth: max_depth,
        }
    }

    /// Guard that already counts `name` as visited (the traversal root)
    pub fn rooted(name: &str, max_depth: usize) -> Self {
        Self {
            visited: vec![name.to_string()],
            remaining_depth: max_depth,
        }
    }

    pub fn enter(&self, name: &str) -> std::result::Result<RefGuard, Stop> {
        if self.visited.iter().any(|v| v == name) {
            return Err(Stop::Circular);
        }
        if self.remaining_depth == 0 {
            return Err(Stop::DepthExhausted);
        }
        let mut visited = self.visited.clone();
        visited.push(name.to_string());
        Ok(RefGuard {
            visited,
            remaining_depth: self.remaining_depth - 1,
        })
    }

    pub fn remaining_depth(&self) -> usize {
        self.remaining_depth
    }

    pub fn path(&self) -> &[String] {
        &self.visited
    }
}

impl Default for RefGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Outcome of following one node through the guard
#[derive(Debug)]
pub enum Resolved<'a> {
    /// Inline schema, plus the guard to use below it
    Schema(&'a Schema, RefGuard),
    /// A reference whose target is absent from the document
    Missing(&'a str),
    /// The guard refused to follow the reference
    Stopped(&'a str, Stop),
}

/// Resolves `$ref` pointers against a document's component schemas
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, SchemaNode>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schemas: &'a IndexMap<String, SchemaNode>) -> Self {
        Self { schemas }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a SchemaNode> {
        self.schemas.get(name)
    }

    /// Single-level resolution: a reference yields its target node (which may
    /// itself be a reference); an inline node yields itself.
    pub fn resolve_once<'n>(&self, node: &'n SchemaNode) -> Option<&'n SchemaNode>
    where
        'a: 'n,
    {
        match node {
            SchemaNode::Reference { reference } => self.lookup(ref_name(reference)),
            SchemaNode::Inline(_) => Some(node),
        }
    }

    /// Dereference chains until an inline schema is reached. Missing or
    /// circular targets yield an empty schema.
    pub fn resolve<'n>(&self, node: &'n SchemaNode) -> &'n Schema
    where
        'a: 'n,
    {
        match self.follow(node, &RefGuard::default()) {
            Resolved::Schema(schema, _) => schema,
            _ => &*EMPTY_SCHEMA,
        }
    }

    /// Dereference `node` through `guard`, returning the inline schema and the
    /// guard that applies to its children.
    pub fn follow<'n>(&self, node: &'n SchemaNode, guard: &RefGuard) -> Resolved<'n>
    where
        'a: 'n,
    {
        let mut current = node;
        let mut guard = guard.clone();
        loop {
            match current {
                SchemaNode::Inline(schema) => return Resolved::Schema(schema, guard),
                SchemaNode::Reference { reference } => {
                    let name = ref_name(reference);
                    guard = match guard.enter(name) {
                        Ok(next) => next,
                        Err(stop) => {
                            debug!(schema = name, ?stop, "Stopped following schema reference");
                            return Resolved::Stopped(name, stop);
                        }
                    };
                    current = match self.lookup(name) {
                        Some(target) => target,
                        None => {
                            debug!(reference = reference.as_str(), "Unresolved schema reference");
                            return Resolved::Missing(name);
                        }
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas() -> IndexMap<String, SchemaNode> {
        serde_json::from_value(json!({
            "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
            "Alias": {"$ref": "#/components/schemas/Pet"},
            "Loop": {"$ref": "#/components/schemas/Loop"}
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_follows_chains() {
        let map = schemas();
        let resolver = SchemaResolver::new(&map);
        let node = SchemaNode::reference_to("Alias");
        assert_eq!(resolver.resolve(&node).schema_type.as_deref(), Some("object"));
    }

    #[test]
    fn test_resolve_once_returns_target_node() {
        let map = schemas();
        let resolver = SchemaResolver::new(&map);
        let node = SchemaNode::reference_to("Alias");
        let target = resolver.resolve_once(&node).unwrap();
        assert_eq!(target.reference_name(), Some("Pet"));
    }

    #[test]
    fn test_missing_reference_resolves_to_empty_schema() {
        let map = schemas();
        let resolver = SchemaResolver::new(&map);
        let node = SchemaNode::reference_to("Ghost");
        assert_eq!(resolver.resolve(&node), &Schema::default());
        assert!(matches!(resolver.follow(&node, &RefGuard::default()), Resolved::Missing("Ghost")));
    }

    #[test]
    fn test_self_reference_is_reported_circular() {
        let map = schemas();
        let resolver = SchemaResolver::new(&map);
        let node = SchemaNode::reference_to("Loop");
        assert!(matches!(
            resolver.follow(&node, &RefGuard::default()),
            Resolved::Stopped("Loop", Stop::Circular)
        ));
    }

    #[test]
    fn test_guard_depth_budget() {
        let guard = RefGuard::new(1);
        let child = guard.enter("A").unwrap();
        assert_eq!(child.remaining_depth(), 0);
        assert_eq!(child.enter("B").unwrap_err(), Stop::DepthExhausted);
        assert_eq!(guard.enter("A").unwrap().path(), &["A".to_string()]);
    }

    #[test]
    fn test_guard_branches_are_independent() {
        let root = RefGuard::new(5);
        let left = root.enter("A").unwrap();
        let right = root.enter("B").unwrap();
        assert!(left.enter("B").is_ok());
        assert_eq!(right.enter("B").unwrap_err(), Stop::Circular);
    }
}
