//! Endpoint search

use crate::analysis::endpoints::{Complexity, EndpointRecord};
use crate::spec::HttpMethod;

/// Search criteria, combined with logical AND. Empty sets and `None` flags
/// do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointFilters {
    /// Case-insensitive substring over path, operation id, summary, description and tags
    pub query: Option<String>,
    pub methods: Vec<HttpMethod>,
    /// Matches when the endpoint carries any of these tags (case-insensitive)
    pub tags: Vec<String>,
    pub complexity: Vec<Complexity>,
    pub deprecated: Option<bool>,
    pub has_parameters: Option<bool>,
    pub has_request_body: Option<bool>,
}

impl EndpointFilters {
    pub fn matches(&self, record: &EndpointRecord) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            let haystacks = [
                Some(record.path.as_str()),
                record.operation_id.as_deref(),
                record.summary.as_deref(),
                record.description.as_deref(),
            ];
            let hit = haystacks
                .iter()
                .flatten()
                .any(|text| text.to_lowercase().contains(&needle))
                || record.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if !self.methods.is_empty() && !self.methods.contains(&record.method) {
            return false;
        }

        if !self.tags.is_empty()
            && !record
                .tags
                .iter()
                .any(|t| self.tags.iter().any(|wanted| wanted.eq_ignore_ascii_case(t)))
        {
            return false;
        }

        if !self.complexity.is_empty() && !self.complexity.contains(&record.complexity) {
            return false;
        }

        if let Some(deprecated) = self.deprecated {
            if record.deprecated != deprecated {
                return false;
            }
        }

        if let Some(has_parameters) = self.has_parameters {
            if record.parameters.is_empty() == has_parameters {
                return false;
            }
        }

        if let Some(has_body) = self.has_request_body {
            if record.has_request_body != has_body {
                return false;
            }
        }

        true
    }
}

/// Records matching every supplied filter, in extraction order
pub fn search_endpoints<'a>(
    records: &'a [EndpointRecord],
    filters: &EndpointFilters,
) -> Vec<&'a EndpointRecord> {
    records.iter().filter(|r| filters.matches(r)).collect()
}
