//! Client configuration types.
//!
//! [`ClientConfig`] holds everything needed to attach the Protect Client
//! iframe: the access token, where to attach the iframe, the event callbacks,
//! and the base URL of the embedded application.
//!
//! # Lifecycle
//!
//! 1. The host builds a [`PartialConfig`] (only the access token and the
//!    container id are required).
//! 2. [`ClientConfig::new`] validates it eagerly and fails on the first
//!    violation, before any DOM or transport side effect.
//! 3. The resulting `ClientConfig` exposes read-only accessors only.  It is
//!    owned by the [`Client`](crate::Client) it is handed to.
//!
//! # Design rationale
//!
//! Earlier SDK builds selected the test or production base URL through a
//! process-wide mutable `DEBUG` flag.  Here `debug` is an ordinary field of
//! [`PartialConfig`], so two clients (or two tests) never influence each
//! other.

use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::binding::{EventBinding, PartialEventBinding};

/// Base URL of the Protect Client test environment, used when `debug` is set.
pub const PROTECT_TEST_URL: &str = "https://test-protect-client.luddites.me/";

/// Base URL of the production Protect Client.
pub const PROTECT_PROD_URL: &str = "https://protect-client.luddites.me/";

/// Length of a hyphenated UUID (`8-4-4-4-12`).
const HYPHENATED_UUID_LEN: usize = 36;

/// Errors raised while validating a [`PartialConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The access token is not a hyphenated UUID.
    #[error("An access token UUID is required. '{0}' is not a valid access token.")]
    InvalidAccessToken(String),

    /// `iframe_config.attach_to_id` is empty.
    #[error("iFrameConfig.attachToId must be a non-empty string")]
    MissingAttachToId,

    /// A class name is empty or contains whitespace.
    #[error("iFrameConfig.classNames must be a list of CSS class names, got '{0}'")]
    InvalidClassNames(String),

    /// A custom base URL has a path other than `/`.
    #[error("custom `protectClientUrl` must have pathname \"/\", got '{0}'")]
    NonRootClientUrl(String),

    /// A built-in base URL failed to parse.
    #[error("invalid Protect Client URL: {0}")]
    InvalidClientUrl(#[from] url::ParseError),
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Where and how to attach the iframe, as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct PartialIFrameConfig {
    /// Id of the DOM node the iframe is appended to.
    ///
    /// In Magento this was `"ns8-protect-wrapper"`.
    pub attach_to_id: String,

    /// CSS classes for the iframe element.  Defaults to none.
    ///
    /// In Magento this was `["ns8-protect-client-iframe"]`.
    pub class_names: Option<Vec<String>>,
}

/// Caller-supplied configuration.  Validated by [`ClientConfig::new`].
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    /// Protect access token authorizing the embedded session.  Must be a UUID.
    pub access_token: String,

    /// Where to attach the iframe.
    pub iframe_config: PartialIFrameConfig,

    /// Callbacks for the events the caller wants to observe.
    pub event_binding: PartialEventBinding,

    /// Custom base URL of the Protect Client.  Must have path `/`.
    ///
    /// When absent, [`PROTECT_TEST_URL`] is used if `debug` is set and
    /// [`PROTECT_PROD_URL`] otherwise.
    pub protect_client_url: Option<Url>,

    /// Selects the test environment and turns on transport logging.
    pub debug: bool,
}

impl PartialConfig {
    /// Creates a partial config with the two required values and defaults
    /// for everything else.
    pub fn new(access_token: impl Into<String>, attach_to_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            iframe_config: PartialIFrameConfig {
                attach_to_id: attach_to_id.into(),
                class_names: None,
            },
            ..Self::default()
        }
    }
}

// ── Validated config ──────────────────────────────────────────────────────────

/// Validated iframe placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IFrameConfig {
    /// Id of the DOM node the iframe is appended to.  Never empty.
    pub attach_to_id: String,
    /// CSS classes applied to the iframe element.
    pub class_names: Vec<String>,
}

/// All configuration values for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    access_token: String,
    iframe_config: IFrameConfig,
    event_binding: EventBinding,
    protect_client_url: Url,
    debug: bool,
}

impl ClientConfig {
    /// Validates `partial` and builds a complete config.
    ///
    /// Unbound events get a no-op callback, so the resulting
    /// [`EventBinding`] covers every event.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking in order: access
    /// token, container id, class names, base URL.
    pub fn new(partial: PartialConfig) -> Result<Self, ConfigError> {
        let PartialConfig {
            access_token,
            iframe_config,
            event_binding,
            protect_client_url,
            debug,
        } = partial;

        if !is_hyphenated_uuid(&access_token) {
            return Err(ConfigError::InvalidAccessToken(access_token));
        }

        let iframe_config = validate_iframe_config(iframe_config)?;
        let event_binding = EventBinding::from_partial(&event_binding);

        let protect_client_url = match protect_client_url {
            Some(url) => url,
            None => default_client_url(debug)?,
        };
        if protect_client_url.path() != "/" {
            return Err(ConfigError::NonRootClientUrl(protect_client_url.to_string()));
        }

        Ok(Self {
            access_token,
            iframe_config,
            event_binding,
            protect_client_url,
            debug,
        })
    }

    /// The access token, exactly as supplied.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Where the iframe is attached.
    pub fn iframe_config(&self) -> &IFrameConfig {
        &self.iframe_config
    }

    /// One callback per event.
    pub fn event_binding(&self) -> &EventBinding {
        &self.event_binding
    }

    /// Base URL of the embedded application.  Its path is always `/`.
    pub fn protect_client_url(&self) -> &Url {
        &self.protect_client_url
    }

    /// Whether the test environment and transport logging are enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }
}

/// Returns the built-in base URL for the selected environment.
pub fn default_client_url(debug: bool) -> Result<Url, ConfigError> {
    let raw = if debug { PROTECT_TEST_URL } else { PROTECT_PROD_URL };
    Ok(Url::parse(raw)?)
}

/// Accepts only the canonical `8-4-4-4-12` form, in either case.
///
/// `Uuid::try_parse` alone would also accept the simple, braced, and URN forms.
fn is_hyphenated_uuid(token: &str) -> bool {
    token.len() == HYPHENATED_UUID_LEN && Uuid::try_parse(token).is_ok()
}

fn validate_iframe_config(partial: PartialIFrameConfig) -> Result<IFrameConfig, ConfigError> {
    if partial.attach_to_id.trim().is_empty() {
        return Err(ConfigError::MissingAttachToId);
    }

    let class_names = partial.class_names.unwrap_or_default();
    if let Some(bad) = class_names
        .iter()
        .find(|cn| cn.is_empty() || cn.chars().any(char::is_whitespace))
    {
        return Err(ConfigError::InvalidClassNames(bad.clone()));
    }

    Ok(IFrameConfig {
        attach_to_id: partial.attach_to_id,
        class_names,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
