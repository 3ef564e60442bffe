//! Specification document model and ingestion
//!
//! This module owns everything between raw source text and the typed,
//! OpenAPI 3.0 shaped [`SpecDocument`]: parsing, Swagger 2.0 normalization,
//! reference resolution and source fetching.

pub mod document;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod swagger2;

pub use document::{
    Components, HttpMethod, Info, MediaType, OAuthFlow, Operation, Parameter, PathItem, RefOr,
    RequestBody, Response, SecurityRequirement, SecurityScheme, Server, SpecDocument, Tag,
};
pub use loader::{load_document, parse_source_text, LoadedDocument, SourceFormat};
pub use resolver::{RefGuard, Resolved, SchemaResolver, Stop, DEFAULT_MAX_DEPTH};
pub use schema::{
    collect_value_references, ref_name, schema_ref, AdditionalProperties, Schema, SchemaEdge,
    SchemaKind, SchemaNode,
};
pub use source::{SourceFetcher, SpecSource};
pub use swagger2::normalize;
