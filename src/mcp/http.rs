//! HTTP transport
//!
//! `POST /mcp/jsonrpc` carries JSON-RPC requests, `GET /mcp/tools` lists the
//! catalogue and `GET /health` reports liveness and whether a document is
//! loaded.

use crate::error::Result;
use crate::mcp::server::McpServer;
use crate::mcp::types::McpRequest;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Register the MCP routes on an actix application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/mcp/jsonrpc", web::post().to(mcp_jsonrpc_handler))
        .route("/mcp/tools", web::get().to(list_tools_handler));
}

pub async fn start_http_server(server: Arc<McpServer>, host: &str, port: u16) -> Result<()> {
    info!("Starting MCP HTTP server on {}:{}", host, port);
    let data = web::Data::from(server);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    info!("MCP HTTP server stopped");
    Ok(())
}

/// Health check endpoint
pub async fn health_check(server: web::Data<McpServer>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "specLoaded": server.is_loaded().await
    }))
}

/// MCP JSON-RPC 2.0 endpoint
pub async fn mcp_jsonrpc_handler(body: web::Json<McpRequest>, server: web::Data<McpServer>) -> HttpResponse {
    match server.handle_mcp_request(body.into_inner()).await {
        Some(response) => HttpResponse::Ok().json(response),
        // No response needed for notifications
        None => HttpResponse::Accepted().finish(),
    }
}

/// List tools endpoint
pub async fn list_tools_handler(server: web::Data<McpServer>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "tools": server.tools() }))
}
