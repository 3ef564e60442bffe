//! Analysis core
//!
//! Read-only queries over a loaded [`SpecDocument`](crate::spec::SpecDocument)
//! and its endpoint records. Nothing in here mutates the document; anomalies
//! such as dangling references surface as data in the reports.

pub mod endpoints;
pub mod evolution;
pub mod examples;
pub mod graph;
pub mod mock;
pub mod overview;
pub mod properties;
pub mod search;
pub mod security;
pub mod snippets;

pub use endpoints::{
    endpoint_id, extract_endpoints, get_endpoint, Complexity, EndpointRecord, ResponseTime,
};
pub use evolution::{assess_evolution, EvolutionReport, Level, RiskSummary, SchemaEvolution};
pub use examples::{
    validate_examples, ExampleCheck, ExampleValidationReport, ExampleValidator, Violation,
};
pub use graph::{DependencyReport, DependencyTree, SchemaGraph, TraceDirection, UnusedSchemaReport};
pub use mock::{
    generate_mock, generate_mock_with_rng, BodyTarget, MockGenerator, MockOptions, MockResult,
    MockTarget, MAX_ARRAY_ITEMS,
};
pub use overview::{export_document, overview, ApiOverview, ComplexityBreakdown, ExportFormat};
pub use properties::{search_properties, PropertyCriteria, PropertyMatch, SearchIn};
pub use search::{search_endpoints, EndpointFilters};
pub use security::{analyze_security, SecurityFinding, SecurityReport, SchemeSummary, Severity};
pub use snippets::{generate_code_example, CodeExample, CodeLanguage};
