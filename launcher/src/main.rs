use anyhow::{Context, Result};
use clap::Parser;
use hooktap_shared::config::Service;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod probe;
mod scan;

use scan::UrlScanner;

#[derive(Parser)]
#[command(name = "hooktap")]
#[command(version = "0.1.0")]
#[command(about = "Boot a webhook service and expose it through a quick tunnel", long_about = None)]
struct Cli {
    /// Service to boot: generic, pre-send, or post-send
    #[arg(default_value = "generic")]
    service: String,

    /// Force-enable the tunnel even if cloudflared is not detected
    #[arg(short = 't', long)]
    tunnel: bool,

    /// Force-disable the tunnel and run the listener alone
    #[arg(long = "no-tunnel", alias = "nt")]
    no_tunnel: bool,

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

    // A panicking forwarder task leaves the children unobserved; take
    // the whole process down instead of limping on.
    std::panic::set_hook(Box::new(|info| {
        error!("fatal: {info}");
        std::process::exit(1);
    }));

    let service = Service::from_name(&cli.service)?;
    let config = service.config();

    // Force-enable wins over force-disable, which wins over detection.
    // Forcing the tunnel without a working probe still attempts the spawn
    // and fails fatally there.
    let tunnel_bin: Option<PathBuf> = if cli.tunnel {
        Some(
            probe::detect()
                .await
                .unwrap_or_else(|| PathBuf::from(probe::TUNNEL_BIN)),
        )
    } else if cli.no_tunnel {
        None
    } else {
        probe::detect().await
    };

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<(&'static str, String)>();

    let server_bin = resolve_server_bin();
    let mut server = Command::new(&server_bin)
        .arg(service.name())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn server: {}", server_bin.display()))?;
    forward_lines("server", server.stdout.take(), line_tx.clone());
    forward_lines("server", server.stderr.take(), line_tx.clone());

    let mut tunnel: Option<Child> = match &tunnel_bin {
        Some(bin) => {
            info!("starting tunnel client: {}", bin.display());
            let mut child = Command::new(bin)
                .args([
                    "tunnel",
                    "--url",
                    &format!("http://localhost:{}", config.port),
                ])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .with_context(|| format!("failed to spawn tunnel client: {}", bin.display()))?;
            forward_lines("tunnel", child.stdout.take(), line_tx.clone());
            forward_lines("tunnel", child.stderr.take(), line_tx.clone());
            Some(child)
        }
        None => {
            info!("tunnel disabled, serving locally only");
            println!(
                "\nwebhook endpoint: POST http://localhost:{}{}\n",
                config.port, config.webhook_path
            );
            None
        }
    };
    drop(line_tx);

    let mut scanner = UrlScanner::new()?;
    let mut streams_open = true;

    loop {
        tokio::select! {
            maybe = line_rx.recv(), if streams_open => {
                match maybe {
                    Some((tag, line)) => {
                        // Echo first; scanning must never gate the pass-through
                        println!("[{tag}] {line}");
                        if tag == "tunnel" {
                            if let Some(url) = scanner.observe(&line) {
                                announce(&url, config.webhook_path);
                            }
                        }
                    }
                    None => streams_open = false,
                }
            }
            status = server.wait() => {
                let status = status.context("failed to wait on server process")?;
                info!("server exited: {status}");
                if let Some(child) = tunnel.as_mut() {
                    let _ = child.kill().await;
                }
                std::process::exit(exit_code(&status));
            }
            Some(status) = wait_optional(&mut tunnel) => {
                let status = status.context("failed to wait on tunnel process")?;
                warn!("tunnel client exited: {status}");
                let _ = server.kill().await;
                std::process::exit(exit_code(&status));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down...");
                if let Some(child) = tunnel.as_mut() {
                    let _ = child.kill().await;
                }
                let _ = server.kill().await;
                return Ok(());
            }
        }
    }
}

/// Prefer the server binary installed next to the launcher, falling back
/// to a PATH lookup.
fn resolve_server_bin() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("hooktap-server");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("hooktap-server")
}

/// Spawn a reader task that forwards each line of a child stream, tagged
/// with its origin.
fn forward_lines<R>(
    tag: &'static str,
    stream: Option<R>,
    tx: mpsc::UnboundedSender<(&'static str, String)>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Some(stream) = stream else {
        return;
    };
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send((tag, line)).is_err() {
                break;
            }
        }
    });
}

async fn wait_optional(child: &mut Option<Child>) -> Option<std::io::Result<ExitStatus>> {
    match child.as_mut() {
        Some(child) => Some(child.wait().await),
        None => None,
    }
}

fn announce(base_url: &str, webhook_path: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║  🌍 Webhook URL (copy below)                                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("{base_url}{webhook_path}\n");
}

/// Map a child's exit status onto the launcher's own: same code, or the
/// conventional 128+signal for a signal death.
#[cfg(unix)]
fn exit_code(status: &ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
