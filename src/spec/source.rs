//! Fetching raw specification text from URLs, files or inline content

use crate::config::FetchConfig;
use crate::error::{ExplorerError, Result};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Where specification text comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SpecSource {
    Url(Url),
    File(PathBuf),
    Inline(String),
}

impl SpecSource {
    /// Interpret a user-supplied location: `http(s)://` URLs are fetched,
    /// `file://` URLs and everything else are read from disk.
    pub fn from_location(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ExplorerError::validation("Specification source is empty"));
        }
        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(SpecSource::Url(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(SpecSource::File)
                .map_err(|_| ExplorerError::validation(format!("Invalid file URL: {}", location))),
            // Windows drive letters parse as a one-letter scheme
            Ok(url) if url.scheme().len() > 1 => Err(ExplorerError::unsupported_option(
                "source scheme",
                url.scheme(),
                &["http", "https", "file"],
            )),
            _ => Ok(SpecSource::File(PathBuf::from(location))),
        }
    }

    /// Short label used in session metadata and logs
    pub fn label(&self) -> String {
        match self {
            SpecSource::Url(url) => url.to_string(),
            SpecSource::File(path) => path.display().to_string(),
            SpecSource::Inline(_) => "inline content".to_string(),
        }
    }
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Reads specification text; the only asynchronous step before parsing
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Fetch the full text of a source
    pub async fn fetch(&self, source: &SpecSource) -> Result<String> {
        match source {
            SpecSource::Inline(content) => Ok(content.clone()),
            SpecSource::File(path) => {
                debug!(path = %path.display(), "Reading specification file");
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    ExplorerError::fetch(format!("Failed to read {}: {}", path.display(), e))
                })
            }
            SpecSource::Url(url) => self.fetch_url(url).await,
        }
    }

    async fn fetch_url(&self, url: &Url) -> Result<String> {
        info!(url = %url, "Fetching specification");
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json, application/yaml, text/yaml, */*")
            .send()
            .await
            .map_err(|e| ExplorerError::fetch(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            error!(url = %url, status = %status, "Specification fetch failed");
            return Err(ExplorerError::fetch(format!(
                "Fetching {} returned HTTP {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let text = response.text().await?;
        debug!(url = %url, content_type = content_type.as_str(), bytes = text.len(), "Fetched specification");
        Ok(text)
    }
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_classification() {
        assert!(matches!(
            SpecSource::from_location("https://example.com/openapi.json").unwrap(),
            SpecSource::Url(_)
        ));
        assert_eq!(
            SpecSource::from_location("./specs/petstore.yaml").unwrap(),
            SpecSource::File(PathBuf::from("./specs/petstore.yaml"))
        );
        assert!(matches!(
            SpecSource::from_location("file:///tmp/api.yaml").unwrap(),
            SpecSource::File(_)
        ));
    }

    #[test]
    fn test_unsupported_scheme_and_empty_location() {
        let err = SpecSource::from_location("ftp://example.com/spec.json").unwrap_err();
        assert_eq!(err.category(), "unsupported_option");
        assert_eq!(SpecSource::from_location("  ").unwrap_err().category(), "validation");
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let fetcher = SourceFetcher::default();
        let err = fetcher
            .fetch(&SpecSource::File(PathBuf::from("/definitely/not/here.yaml")))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "fetch");
    }

    #[tokio::test]
    async fn test_inline_content_is_returned_verbatim() {
        let fetcher = SourceFetcher::default();
        let text = fetcher
            .fetch(&SpecSource::Inline("openapi: 3.0.0".to_string()))
            .await
            .unwrap();
        assert_eq!(text, "openapi: 3.0.0");
    }
}
