//! OpenLine collector client
//!
//! Best-effort delivery of frames to the collector and receipts to a
//! local file. Failures here are reported to the caller and logged; they
//! are never allowed to steer the monitoring loop.

use crate::contracts::{Frame, Receipt};
use crate::error::{GuardError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default collector base URL when no environment override is set
pub const DEFAULT_OLP_BASE: &str = "http://127.0.0.1:8088";

/// Default local receipt path
pub const DEFAULT_RECEIPT_PATH: &str = "docs/receipt.latest.json";

/// Collector client
pub struct OlpClient {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OlpClient {
    /// Create a client posting frames to `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Create a client from the environment
    ///
    /// `OLP_URL` wins outright; otherwise `OLP_BASE` (or the default
    /// base) with the fixed `/frame` path appended.
    pub fn from_env() -> Self {
        Self::new(frame_url(
            std::env::var("OLP_URL").ok(),
            std::env::var("OLP_BASE").ok(),
        ))
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Frame endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a frame to the collector
    ///
    /// Returns the collector's JSON body; a non-JSON body is wrapped as
    /// `{"ok": false, "raw": ...}` rather than treated as a failure.
    pub async fn post_frame(&self, frame: &Frame) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(&self.url)
            .json(frame)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GuardError::submission(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GuardError::submission(e.to_string()))?;

        if !status.is_success() {
            return Err(GuardError::submission(format!(
                "collector returned {}: {}",
                status, text
            )));
        }

        Ok(serde_json::from_str(&text).unwrap_or_else(|_| {
            serde_json::json!({ "ok": false, "raw": text })
        }))
    }
}

/// Resolve the frame endpoint from an explicit URL override or a base URL
fn frame_url(explicit: Option<String>, base: Option<String>) -> String {
    if let Some(url) = explicit {
        return url;
    }
    let base = base.unwrap_or_else(|| DEFAULT_OLP_BASE.to_string());
    format!("{}/frame", base.trim_end_matches('/'))
}

/// Write a receipt document, creating parent directories as needed
pub fn write_receipt_file(receipt: &Receipt, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GuardError::submission(format!("{}: {}", parent.display(), e)))?;
        }
    }

    let body = serde_json::to_string_pretty(receipt)
        .map_err(|e| GuardError::submission(e.to_string()))?;
    std::fs::write(path, body)
        .map_err(|e| GuardError::submission(format!("{}: {}", path.display(), e)))?;

    Ok(path.to_path_buf())
}
