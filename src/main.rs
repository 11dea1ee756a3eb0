//! Odoo MCP Server - Rust Implementation
//!
//! Serves the Odoo XML-RPC API either as MCP tools on stdio (default) or as a
//! REST API over HTTP.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use odoo_mcp_server::config::Config;
use odoo_mcp_server::http::{self, AppState};
use odoo_mcp_server::mcp::server::McpServer;
use odoo_mcp_server::odoo::session::Session;
use odoo_mcp_server::odoo::types::{ConnectRequest, ConnectionParams};

/// Odoo MCP Server
#[derive(Parser)]
#[command(name = "odoo-mcp-server")]
#[command(author, version, about = "Odoo MCP Server - MCP and REST access to an Odoo instance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Connect with the ODOO_* environment variables at startup
    #[arg(long, global = true)]
    connect_on_start: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Stdio,

    /// Serve the REST API over HTTP
    Http {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries MCP messages
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(log_level(cli.verbose, cli.quiet).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::new().context("Failed to load configuration")?;
    let session = Session::new(config.request_timeout);

    if cli.connect_on_start {
        connect_from_env(&session, &config).await;
    }

    match cli.command {
        Some(Commands::Http { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            http::serve(AppState::new(session, config))
                .await
                .context("HTTP server failed")?;
        }
        Some(Commands::Stdio) | None => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Odoo MCP server on stdio");

            let mut server = McpServer::new(session, config.odoo.clone());
            server.run_stdio().await.context("MCP server failed")?;
        }
    }

    Ok(())
}

/// Eager connection; failures are logged and the server starts disconnected
async fn connect_from_env(session: &Session, config: &Config) {
    let params = match ConnectionParams::resolve(ConnectRequest::default(), &config.odoo) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Skipping startup connection: {}", e);
            return;
        }
    };

    if let Err(e) = session.connect(params).await {
        tracing::warn!("Startup connection failed: {}", e);
    }
}
