//! Security-pattern extraction
//!
//! Summarises the declared security schemes and how endpoints use them. The
//! findings are advisory observations, not a security scan.

use crate::analysis::endpoints::EndpointRecord;
use crate::spec::SpecDocument;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub flow: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// `in` for API keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<FlowSummary>,
    pub endpoint_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityFinding {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub schemes: Vec<SchemeSummary>,
    pub global_requirements: Vec<String>,
    pub protected_endpoints: Vec<String>,
    pub public_endpoints: Vec<String>,
    pub unused_schemes: Vec<String>,
    pub undefined_schemes: Vec<String>,
    pub findings: Vec<SecurityFinding>,
}

pub fn analyze_security(doc: &SpecDocument, records: &[EndpointRecord]) -> SecurityReport {
    let defined = &doc.components.security_schemes;

    let mut usage: IndexMap<&str, usize> = IndexMap::new();
    let mut protected_endpoints = Vec::new();
    let mut public_endpoints = Vec::new();
    for record in records {
        if record.is_secured() {
            protected_endpoints.push(record.id.clone());
        } else {
            public_endpoints.push(record.id.clone());
        }
        let names: IndexSet<&str> = record
            .security
            .iter()
            .flat_map(|req| req.keys().map(String::as_str))
            .collect();
        for name in names {
            *usage.entry(name).or_default() += 1;
        }
    }

    let schemes: Vec<SchemeSummary> = defined
        .iter()
        .map(|(name, scheme)| SchemeSummary {
            name: name.clone(),
            scheme_type: scheme.scheme_type.clone(),
            scheme: scheme.scheme.clone(),
            location: scheme.location.clone(),
            parameter_name: scheme.name.clone(),
            bearer_format: scheme.bearer_format.clone(),
            flows: scheme
                .flows
                .iter()
                .flatten()
                .map(|(flow, details)| FlowSummary {
                    flow: flow.clone(),
                    authorization_url: details.authorization_url.clone(),
                    token_url: details.token_url.clone(),
                    scopes: details.scopes.keys().cloned().collect(),
                })
                .collect(),
            endpoint_count: usage.get(name.as_str()).copied().unwrap_or(0),
        })
        .collect();

    let global_requirements: Vec<String> = doc
        .security
        .iter()
        .flat_map(|req| req.keys().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    let unused_schemes = schemes
        .iter()
        .filter(|s| s.endpoint_count == 0 && !global_requirements.contains(&s.name))
        .map(|s| s.name.clone())
        .collect();
    let undefined_schemes = usage
        .keys()
        .copied()
        .chain(global_requirements.iter().map(String::as_str))
        .filter(|name| !defined.contains_key(*name))
        .map(String::from)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    let findings = findings(&schemes, records);

    SecurityReport {
        schemes,
        global_requirements,
        protected_endpoints,
        public_endpoints,
        unused_schemes,
        undefined_schemes,
        findings,
    }
}

fn findings(schemes: &[SchemeSummary], records: &[EndpointRecord]) -> Vec<SecurityFinding> {
    let mut findings = Vec::new();

    if schemes.is_empty() {
        findings.push(SecurityFinding {
            severity: Severity::Warning,
            message: "No security schemes are defined".to_string(),
        });
    }

    for scheme in schemes.iter().filter(|s| s.endpoint_count > 0) {
        if scheme.scheme_type == "http" && scheme.scheme.as_deref() == Some("basic") {
            findings.push(SecurityFinding {
                severity: Severity::Warning,
                message: format!(
                    "'{}' uses HTTP basic authentication; prefer bearer tokens or OAuth 2",
                    scheme.name
                ),
            });
        }
        if scheme.scheme_type == "apiKey" && scheme.location.as_deref() == Some("query") {
            findings.push(SecurityFinding {
                severity: Severity::Warning,
                message: format!(
                    "API key '{}' travels in the query string and can leak into logs",
                    scheme.name
                ),
            });
        }
    }

    let exposed: Vec<String> = records
        .iter()
        .filter(|r| r.method.is_mutating() && !r.is_secured())
        .map(|r| r.label())
        .collect();
    if !exposed.is_empty() {
        findings.push(SecurityFinding {
            severity: Severity::High,
            message: format!(
                "{} state-changing endpoint(s) have no security requirement: {}",
                exposed.len(),
                exposed.join(", ")
            ),
        });
    }

    if findings.is_empty() {
        findings.push(SecurityFinding {
            severity: Severity::Info,
            message: "No notable security patterns detected".to_string(),
        });
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::endpoints::extract_endpoints;
    use serde_json::json;

    #[test]
    fn test_scheme_usage_and_findings() {
        let doc: SpecDocument = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "security": [{"key": []}],
            "paths": {
                "/pets": {
                    "get": {"responses": {}},
                    "post": {"security": [], "responses": {}},
                    "put": {"security": [{"basic": []}, {"ghost": []}], "responses": {}}
                }
            },
            "components": {"securitySchemes": {
                "key": {"type": "apiKey", "name": "api_key", "in": "query"},
                "basic": {"type": "http", "scheme": "basic"},
                "oauth": {"type": "oauth2", "flows": {"clientCredentials": {"tokenUrl": "https://t", "scopes": {"read": "r"}}}}
            }}
        }))
        .unwrap();
        let records = extract_endpoints(&doc);
        let report = analyze_security(&doc, &records);

        assert_eq!(report.global_requirements, vec!["key"]);
        assert_eq!(report.public_endpoints, vec!["POST__pets"]);
        assert_eq!(report.protected_endpoints.len(), 2);
        assert_eq!(report.schemes[0].endpoint_count, 1);
        assert_eq!(report.schemes[2].flows[0].scopes, vec!["read"]);
        assert_eq!(report.unused_schemes, vec!["oauth"]);
        assert_eq!(report.undefined_schemes, vec!["ghost"]);
        assert_eq!(report.findings.len(), 3);
        assert!(report.findings.iter().any(|f| f.severity == Severity::High));
    }

    #[test]
    fn test_document_without_schemes() {
        let doc: SpecDocument = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {"/health": {"get": {"responses": {}}}}
        }))
        .unwrap();
        let report = analyze_security(&doc, &extract_endpoints(&doc));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].message, "No security schemes are defined");
    }
}
