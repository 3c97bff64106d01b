use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use argocd_mcp::argocd::ArgoClient;
use argocd_mcp::config::{ArgoConfig, Transport, TransportConfig, DEFAULT_HOST, DEFAULT_PORT};
use argocd_mcp::mcp::ArgoMcpServer;
use argocd_mcp::{api, mcp};

#[derive(Parser)]
#[command(name = "argocd-mcp")]
#[command(about = "MCP server for Argo CD applications and projects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (default when MCP_TRANSPORT is unset)
    Stdio,
    /// Serve MCP over HTTP (POST /mcp)
    Http {
        /// Address to bind
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

/// Initialize tracing with output to stderr (for stdio mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "argocd_mcp=info,tower_http=info".into()),
    );

    if use_stderr {
        // stdio mode: stdout is the protocol channel
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let transport = match cli.command {
        Some(Commands::Stdio) => TransportConfig::default(),
        Some(Commands::Http { host, port }) => TransportConfig {
            transport: Transport::Http,
            host,
            port,
        },
        None => TransportConfig::from_env().context("Configuration error")?,
    };

    init_tracing(transport.transport == Transport::Stdio);

    let config = ArgoConfig::from_env()
        .inspect_err(|e| tracing::error!("Configuration error: {}", e))
        .context("Configuration error")?;
    let client = ArgoClient::new(&config).context("Failed to initialize ArgoCD client")?;
    tracing::info!("ArgoCD client initialized for {}", client.base_url());

    let server = ArgoMcpServer::new(client);

    match transport.transport {
        Transport::Stdio => mcp::run_stdio_server(server).await?,
        Transport::Http => {
            tracing::info!("Starting ArgoCD MCP server on {}", transport.bind_address());
            api::serve(server, &transport.bind_address()).await?;
        }
    }

    Ok(())
}
