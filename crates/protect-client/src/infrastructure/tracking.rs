//! Tracking script loader.
//!
//! Host platforms embed the Protect tracking script in their storefront pages.
//! [`TrackingScriptLoader`] fetches it and returns it wrapped in a `<script>`
//! element, ready to be written into a page template.
//!
//! Only the default script is cached.  A caller asking for an alternate URL
//! always gets a fresh fetch, and that fetch never replaces the cached default.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;
use url::Url;

/// Default location of the tracking script.
pub const TRUE_STATS_URL: &str = "https://test-api-v1.ns8.com/web";

/// Error type for tracking script retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// The script could not be fetched.
    #[error("Failed to get tracking script. {0}")]
    Fetch(String),

    /// The script URL could not be parsed.
    #[error("invalid tracking script URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Retrieves the raw text of a script.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptFetcher: Send + Sync {
    /// Fetches the body at `url`.
    async fn fetch(&self, url: &Url) -> Result<String, TrackingError>;
}

/// [`ScriptFetcher`] that issues an HTTP GET.
#[derive(Debug, Clone, Default)]
pub struct HttpScriptFetcher {
    client: reqwest::Client,
}

impl HttpScriptFetcher {
    /// Creates a fetcher with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScriptFetcher for HttpScriptFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, TrackingError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TrackingError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unexpected status");
            return Err(TrackingError::Fetch(format!("{} {reason}", status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| TrackingError::Fetch(e.to_string()))
    }
}

/// Fetches and caches the tracking script.
pub struct TrackingScriptLoader {
    fetcher: Arc<dyn ScriptFetcher>,
    cached: Mutex<Option<String>>,
}

impl TrackingScriptLoader {
    /// Creates a loader over `fetcher` with an empty cache.
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self {
            fetcher,
            cached: Mutex::new(None),
        }
    }

    /// Returns the script at `url` (the default script when `None`) wrapped in
    /// `<script>..</script>`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Fetch`] if the fetch fails.  The failure is
    /// also logged.
    pub async fn tracking_script(&self, url: Option<&Url>) -> Result<String, TrackingError> {
        let default_url = Url::parse(TRUE_STATS_URL)?;
        let url = url.unwrap_or(&default_url);
        let is_default = *url == default_url;

        if is_default {
            if let Some(script) = self.cached_script() {
                return Ok(script);
            }
        }

        let body = self.fetcher.fetch(url).await.map_err(|e| {
            error!("{e}");
            e
        })?;
        let script = format!("<script>{body}</script>");

        if is_default {
            *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(script.clone());
        }
        Ok(script)
    }

    fn cached_script(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
