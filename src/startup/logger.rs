//! Startup logging

use crate::config::Config;
use crate::session::LoadSummary;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Transport the process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Stdio,
    Http,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Stdio => f.write_str("stdio"),
            RunMode::Http => f.write_str("http"),
        }
    }
}

/// Startup logger for configuration and session information
pub struct StartupLogger;

impl StartupLogger {
    pub fn display_startup_info(
        config: &Config,
        config_path: Option<&Path>,
        mode: RunMode,
        additional_info: &StartupAdditionalInfo,
    ) {
        info!("OpenAPI Explorer v{} starting in {} mode", env!("CARGO_PKG_VERSION"), mode);

        Self::display_configuration(config, config_path);
        Self::display_session(additional_info);

        if mode == RunMode::Http {
            info!("Server Information:");
            info!("   JSON-RPC: http://{}:{}/mcp/jsonrpc", config.server.host, config.server.port);
            info!("   Tools:    http://{}:{}/mcp/tools", config.server.host, config.server.port);
            info!("   Health:   http://{}:{}/health", config.server.host, config.server.port);
        }
        info!("{} tools available", additional_info.tools_available);
    }

    fn display_configuration(config: &Config, config_path: Option<&Path>) {
        info!("Configuration:");
        match config_path {
            Some(path) if path.exists() => info!("   Config file: {}", path.display()),
            _ => info!("   Config file: built-in defaults"),
        }
        info!(
            "   Analysis: depth {}, mock cap {}, optional probability {}, strict examples {}",
            config.analysis.default_depth,
            config.analysis.max_mock_count,
            config.analysis.optional_property_probability,
            config.analysis.strict_validation
        );
        info!("   Fetch timeout: {}s", config.fetch.timeout_secs);
        info!("   Log format: {}", config.logging.format);
    }

    fn display_session(additional_info: &StartupAdditionalInfo) {
        match (&additional_info.preload_source, &additional_info.preloaded) {
            (Some(_), Some(summary)) => info!(
                "Preloaded '{}' v{} from {} ({} endpoints, {} schemas)",
                summary.title, summary.version, summary.source, summary.endpoint_count, summary.schema_count
            ),
            (Some(source), None) => warn!("Preloading {} failed; starting with an empty session", source),
            (None, _) => info!("No specification preloaded; call load_openapi_spec to begin"),
        }
    }
}

/// Facts gathered during startup that the configuration does not hold
pub struct StartupAdditionalInfo {
    pub tools_available: usize,
    pub preload_source: Option<String>,
    pub preloaded: Option<LoadSummary>,
}

impl StartupAdditionalInfo {
    pub fn new(tools_available: usize) -> Self {
        Self {
            tools_available,
            preload_source: None,
            preloaded: None,
        }
    }

    pub fn with_preload(mut self, source: String, preloaded: Option<LoadSummary>) -> Self {
        self.preload_source = Some(source);
        self.preloaded = preloaded;
        self
    }
}

/// Display startup banner with version information
pub fn display_startup_banner(version: &str) {
    info!("");
    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║                   OpenAPI Explorer v{:<24} ║", version);
    info!("║          Specification analysis over the MCP protocol        ║");
    info!("╚══════════════════════════════════════════════════════════════╝");
    info!("");
}
