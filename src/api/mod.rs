mod handlers;
pub mod jsonrpc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::mcp::ArgoMcpServer;

pub fn create_router(server: ArgoMcpServer) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/mcp", post(handlers::mcp))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(server)
}

/// Serve the HTTP transport until Ctrl+C.
pub async fn serve(server: ArgoMcpServer, addr: &str) -> anyhow::Result<()> {
    let app = create_router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("ArgoCD MCP server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ArgoCD MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
