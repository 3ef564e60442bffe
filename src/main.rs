use anyhow::Result;
use clap::Parser;
use openapi_explorer::config::{Config, EnvVars, LoggingConfig};
use openapi_explorer::mcp::McpServer;
use openapi_explorer::startup::{self, RunMode, StartupAdditionalInfo, StartupLogger};
use openapi_explorer::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to $EXPLORER_CONFIG_PATH, then config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// Run in stdio mode for MCP clients instead of serving HTTP
    #[arg(long)]
    stdio: bool,

    /// Load this specification (URL or file path) before accepting requests
    #[arg(long)]
    spec: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| EnvVars::get(EnvVars::CONFIG_PATH).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = match Config::load(&config_path, cli.host.clone(), cli.port) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }

    init_logging(&config.logging)?;
    startup::display_startup_banner(env!("CARGO_PKG_VERSION"));

    let server = Arc::new(McpServer::new(&config));

    let mut startup_info = StartupAdditionalInfo::new(server.tools().len());
    if let Some(location) = cli.spec.clone() {
        let preloaded = match server.load_source(&location).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!("Failed to preload {}: {}", location, e);
                None
            }
        };
        startup_info = startup_info.with_preload(location, preloaded);
    }

    let mode = if cli.stdio { RunMode::Stdio } else { RunMode::Http };
    StartupLogger::display_startup_info(&config, Some(config_path.as_path()), mode, &startup_info);

    match mode {
        RunMode::Stdio => run_stdio_mode(server).await,
        RunMode::Http => {
            openapi_explorer::mcp::start_http_server(server, &config.server.host, config.server.port).await?;
            Ok(())
        }
    }
}

/// Line-delimited JSON-RPC over stdin/stdout
async fn run_stdio_mode(server: Arc<McpServer>) -> Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    info!("stdio mode ready - waiting for JSON-RPC messages");

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                // EOF - client disconnected
                info!("stdin closed, shutting down stdio mode");
                break;
            }
            Ok(_) => {
                let trimmed_line = line.trim();
                if trimmed_line.is_empty() {
                    continue;
                }

                let Some(response) = server.handle_message(trimmed_line).await else {
                    debug!("notification handled, nothing to write");
                    continue;
                };
                if let Err(e) = write_frame(&mut stdout, &response).await {
                    error!("Failed to write response to stdout: {}", e);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn write_frame(stdout: &mut tokio::io::Stdout, frame: &str) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    stdout.write_all(frame.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // stdout belongs to the stdio transport
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.with_file(true).with_line_number(true).try_init()
    };
    if let Err(e) = result {
        warn!("Logging was already initialised: {}", e);
    }

    Ok(())
}
