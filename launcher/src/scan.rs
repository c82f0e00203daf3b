//! Tunnel URL discovery.
//!
//! The quick tunnel never signals registration explicitly; the assigned
//! hostname only ever appears in its log output. The scanner watches the
//! forwarded stream for the hostname grammar and reacts to the first
//! match only — later matches in the stream are ignored.

use anyhow::Result;
use regex::Regex;

/// Hostname grammar of a quick-tunnel URL: https scheme, lowercase
/// alphanumeric-and-hyphen subdomain, fixed suffix.
const TUNNEL_URL_PATTERN: &str = r"https://[a-z0-9-]+\.trycloudflare\.com";

pub struct UrlScanner {
    pattern: Regex,
    announced: bool,
}

impl UrlScanner {
    pub fn new() -> Result<Self> {
        Ok(UrlScanner {
            pattern: Regex::new(TUNNEL_URL_PATTERN)?,
            announced: false,
        })
    }

    /// Scan one output chunk. Returns the matched base URL the first time
    /// a chunk contains one, and None forever after.
    pub fn observe(&mut self, chunk: &str) -> Option<String> {
        if self.announced {
            return None;
        }
        let found = self.pattern.find(chunk)?;
        self.announced = true;
        Some(found.as_str().to_string())
    }
}
