use anyhow::{Context, Result};
use clap::Parser;
use hooktap_shared::config::Service;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

mod body;
mod handlers;

use handlers::AppState;

#[derive(Parser)]
#[command(name = "hooktap-server")]
#[command(version = "0.1.0")]
#[command(about = "Local webhook tap for IM pre/post-send callbacks", long_about = None)]
struct Cli {
    /// Service to boot: generic, pre-send, or post-send
    #[arg(default_value = "generic")]
    service: String,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    // A panicking handler leaves nothing worth continuing with; take the
    // whole process down instead of limping on.
    std::panic::set_hook(Box::new(|info| {
        error!("fatal: {info}");
        std::process::exit(1);
    }));

    let service = Service::from_name(&cli.service)?;
    let mut config = service.config();
    if let Some(port) = cli.port {
        config.port = port;
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!(
        "{} webhook service on http://localhost:{}",
        service.name(),
        config.port
    );
    info!("listening path: POST {}", config.webhook_path);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    let state = AppState {
        config: Arc::new(config),
    };
    axum::serve(listener, handlers::router(state)).await?;
    Ok(())
}
