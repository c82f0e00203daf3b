//! Tunnel-capability detection.
//!
//! Probes for the cloudflared executable before deciding whether to wrap
//! the listener in a quick tunnel: direct invocation first, then a PATH
//! lookup via `which` and a retry on the resolved path.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

pub const TUNNEL_BIN: &str = "cloudflared";

/// Locate a working cloudflared, or None when the host has none.
pub async fn detect() -> Option<PathBuf> {
    if version_ok(Path::new(TUNNEL_BIN)).await {
        return Some(PathBuf::from(TUNNEL_BIN));
    }
    debug!("direct {TUNNEL_BIN} invocation failed, trying PATH lookup");

    let output = Command::new("which").arg(TUNNEL_BIN).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let resolved = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if resolved.is_empty() {
        return None;
    }

    let path = PathBuf::from(resolved);
    if version_ok(&path).await {
        Some(path)
    } else {
        None
    }
}

async fn version_ok(program: &Path) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}
