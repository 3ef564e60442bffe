//! Schema evolution heuristics
//!
//! Advisory scores only: how easily a schema can grow (extensibility) and how
//! likely a change to it breaks existing clients (breaking-change risk).
//! Neither score says anything about validity.

use crate::error::{ExplorerError, Result};
use crate::spec::{AdditionalProperties, Schema, SchemaResolver, SpecDocument};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    fn extensibility(score: u32) -> Self {
        match score {
            0 => Level::Low,
            1 => Level::Medium,
            _ => Level::High,
        }
    }

    fn risk(score: u32) -> Self {
        match score {
            0..=1 => Level::Low,
            2..=3 => Level::Medium,
            _ => Level::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEvolution {
    pub schema_name: String,
    pub extensibility: Level,
    pub extensibility_score: u32,
    pub breaking_change_risk: Level,
    pub breaking_change_score: u32,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionReport {
    pub assessments: Vec<SchemaEvolution>,
    pub risk_summary: RiskSummary,
}

/// Assess one named schema, or every component schema when `schema_name` is `None`
pub fn assess_evolution(doc: &SpecDocument, schema_name: Option<&str>) -> Result<EvolutionReport> {
    let resolver = SchemaResolver::new(doc.schemas());

    let assessments = match schema_name {
        Some(name) => {
            let node = doc
                .schema(name)
                .ok_or_else(|| ExplorerError::not_found("Schema", name))?;
            vec![assess_schema(name, resolver.resolve(node), &resolver)]
        }
        None => doc
            .schemas()
            .iter()
            .map(|(name, node)| assess_schema(name, resolver.resolve(node), &resolver))
            .collect(),
    };

    let mut risk_summary = RiskSummary::default();
    for assessment in &assessments {
        match assessment.breaking_change_risk {
            Level::Low => risk_summary.low += 1,
            Level::Medium => risk_summary.medium += 1,
            Level::High => risk_summary.high += 1,
        }
    }

    Ok(EvolutionReport {
        assessments,
        risk_summary,
    })
}

/// Constraint counts over one schema level
#[derive(Debug, Default)]
struct Constraints {
    required: bool,
    closed: bool,
    enums: u32,
    patterns: u32,
    bounds: u32,
}

impl Constraints {
    fn add(&mut self, schema: &Schema) {
        self.required |= !schema.required.is_empty();
        self.closed |= matches!(schema.additional_properties, Some(AdditionalProperties::Any(false)));
        if schema.enumeration.is_some() {
            self.enums += 1;
        }
        if schema.pattern.is_some() {
            self.patterns += 1;
        }
        if schema.minimum.is_some() || schema.maximum.is_some() {
            self.bounds += 1;
        }
    }

    fn score(&self) -> u32 {
        u32::from(self.required) + u32::from(self.closed) + self.enums + self.patterns + self.bounds
    }
}

pub fn assess_schema(name: &str, schema: &Schema, resolver: &SchemaResolver<'_>) -> SchemaEvolution {
    let mut factors = Vec::new();
    let mut recommendations = Vec::new();

    let mut extensibility_score = 0;
    match &schema.additional_properties {
        Some(AdditionalProperties::Any(true)) | Some(AdditionalProperties::Schema(_)) => {
            extensibility_score += 2;
            factors.push("Accepts additional properties".to_string());
        }
        _ => {}
    }
    if schema.has_composition() {
        extensibility_score += 1;
        factors.push("Built from oneOf/anyOf/allOf composition".to_string());
    }

    let mut constraints = Constraints::default();
    constraints.add(schema);
    for node in schema.properties.values() {
        constraints.add(resolver.resolve(node));
    }

    if constraints.required {
        factors.push(format!("{} required properties", schema.required.len()));
        recommendations.push(
            "Keep the required list minimal; adding a required property is a breaking change".to_string(),
        );
    }
    if constraints.closed {
        factors.push("additionalProperties is false".to_string());
        recommendations.push(
            "Allow additional properties so new fields can be introduced without breaking clients"
                .to_string(),
        );
    }
    if constraints.enums > 0 {
        factors.push(format!("{} enum constraint(s)", constraints.enums));
        recommendations
            .push("Document how clients should treat enum values they do not recognise".to_string());
    }
    if constraints.patterns > 0 {
        factors.push(format!("{} pattern constraint(s)", constraints.patterns));
        recommendations.push("Only ever relax patterns; tightening one rejects existing data".to_string());
    }
    if constraints.bounds > 0 {
        factors.push(format!("{} numeric bound(s)", constraints.bounds));
    }
    if extensibility_score == 0 {
        recommendations.push("Consider allOf composition to extend this schema in later versions".to_string());
    }

    let breaking_change_score = constraints.score();
    SchemaEvolution {
        schema_name: name.to_string(),
        extensibility: Level::extensibility(extensibility_score),
        extensibility_score,
        breaking_change_risk: Level::risk(breaking_change_score),
        breaking_change_score,
        factors,
        recommendations,
    }
}
