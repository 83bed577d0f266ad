//! Ticket sources for the CLI.
//!
//! The source is chosen from the configured `source` string: an `http(s)://`
//! URL becomes an [`HttpSource`], anything else is a snapshot file.

use std::time::Duration;

use anyhow::{Context, Result};
use hdms_core::error::DeskError;
use hdms_core::source::{FileSource, TicketSource, decode_payload};
use hdms_core::{Snapshot, Ticket, load_snapshot};
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Fetches the ticket feed over HTTP with an optional bearer token.
pub struct HttpSource {
    url: String,
    token: Option<String>,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            url: url.into(),
            token,
            timeout,
            client,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TicketSource for HttpSource {
    fn describe(&self) -> String {
        format!("feed {}", self.url)
    }

    fn fetch(&self) -> hdms_core::Result<Vec<Ticket>> {
        let mut request = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                DeskError::Source(format!("request timed out after {}s", self.timeout.as_secs()))
            } else {
                DeskError::Source(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeskError::Source(format!("feed returned HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|e| DeskError::Source(format!("failed to read response body: {e}")))?;
        debug!(url = %self.url, bytes = body.len(), "Fetched ticket feed");
        decode_payload(&body)
    }
}

/// Stand-in used when no source is configured; every fetch falls back.
pub struct UnconfiguredSource;

impl TicketSource for UnconfiguredSource {
    fn describe(&self) -> String {
        "no source".to_string()
    }

    fn fetch(&self) -> hdms_core::Result<Vec<Ticket>> {
        Err(DeskError::Source("no ticket source configured".to_string()))
    }
}

fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Build the source named by `config.source`.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built.
pub fn source_for(config: &AppConfig) -> Result<Box<dyn TicketSource>> {
    match config.source.as_deref().map(str::trim) {
        Some(url) if is_url(url) => Ok(Box::new(HttpSource::new(
            url,
            config.auth_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?)),
        Some(path) if !path.is_empty() => Ok(Box::new(FileSource::new(path))),
        _ => Ok(Box::new(UnconfiguredSource)),
    }
}

/// Tickets to show when the source fails. Empty unless a fallback file is
/// configured and readable.
#[must_use]
pub fn load_fallback(config: &AppConfig) -> Vec<Ticket> {
    let Some(path) = &config.fallback else {
        return Vec::new();
    };
    match FileSource::new(path).fetch() {
        Ok(tickets) => tickets,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Fallback snapshot unavailable");
            Vec::new()
        }
    }
}

/// Resolve source and fallback from `config` and load a snapshot.
///
/// # Errors
///
/// Returns an error only if the source itself cannot be constructed; fetch
/// failures fall back.
pub fn load(config: &AppConfig) -> Result<Snapshot> {
    let source = source_for(config)?;
    let fallback = load_fallback(config);
    Ok(load_snapshot(source.as_ref(), fallback))
}
