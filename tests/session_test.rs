//! Session lifecycle tests: load, reload, replace and failed loads

use openapi_explorer::spec::SourceFormat;
use openapi_explorer::{ExplorerError, SpecSession};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const SWAGGER2: &str = include_str!("fixtures/petstore_swagger2.json");

#[test]
fn test_reloading_same_text_is_idempotent_except_identity() {
    let mut session = SpecSession::new();

    let first = session.load_text(PETSTORE, "petstore.yaml").unwrap().clone();
    let second = session.load_text(PETSTORE, "petstore.yaml").unwrap().clone();

    assert_ne!(first.id, second.id);
    assert_eq!(first.document, second.document);
    assert_eq!(first.normalized, second.normalized);
    assert_eq!(first.endpoints, second.endpoints);
    assert!(second.loaded_at >= first.loaded_at);
}

#[test]
fn test_every_load_gets_a_distinct_id() {
    let mut session = SpecSession::new();
    let ids: Vec<String> = (0..5)
        .map(|_| session.load_text(PETSTORE, "petstore.yaml").unwrap().id.clone())
        .collect();

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_load_replaces_previous_document() {
    let mut session = SpecSession::new();
    session.load_text(PETSTORE, "petstore.yaml").unwrap();
    session.load_text(SWAGGER2, "petstore_swagger2.json").unwrap();

    let current = session.require().unwrap();
    assert_eq!(current.source, "petstore_swagger2.json");
    assert_eq!(current.format, SourceFormat::Json);
    assert!(current.converted_from_swagger2);
    assert_eq!(current.endpoints.len(), 2);
}

#[test]
fn test_failed_load_keeps_previous_document() {
    let mut session = SpecSession::new();
    let before = session.load_text(PETSTORE, "petstore.yaml").unwrap().id.clone();

    let err = session.load_text(": : not a spec", "broken.yaml").unwrap_err();
    assert!(matches!(err, ExplorerError::Parse { .. } | ExplorerError::Validation { .. }));

    let err = session.load_text("{\"paths\": {}}", "versionless.json").unwrap_err();
    assert!(matches!(err, ExplorerError::Validation { .. }));

    let current = session.require().unwrap();
    assert_eq!(current.id, before);
    assert_eq!(current.source, "petstore.yaml");
}

#[test]
fn test_summary_reflects_loaded_document() {
    let mut session = SpecSession::new();
    let summary = session.load_text(PETSTORE, "petstore.yaml").unwrap().summary();

    assert_eq!(summary.title, "Petstore");
    assert_eq!(summary.version, "1.2.0");
    assert_eq!(summary.source_version, "3.0.3");
    assert_eq!(summary.endpoint_count, 5);
    assert_eq!(summary.schema_count, 9);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["endpointCount"], 5);
    assert_eq!(json["format"], "yaml");
    assert_eq!(json["convertedFromSwagger2"], false);
}

#[test]
fn test_clear_returns_to_empty() {
    let mut session = SpecSession::new();
    session.load_text(PETSTORE, "petstore.yaml").unwrap();
    session.clear();

    assert!(!session.is_loaded());
    assert!(matches!(session.require(), Err(ExplorerError::NotLoaded)));
}
