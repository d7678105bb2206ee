//! TOML settings file for the `protect-client` preview binary.
//!
//! # What is TOML? (for beginners)
//!
//! TOML is a configuration file format designed to be easy to read and
//! write.  A complete settings file looks like this:
//!
//! ```toml
//! access_token = "27802062-34c4-450c-a18f-667324f14375"
//! attach_to_id = "ns8-protect-wrapper"
//! class_names = ["ns8-protect-client-iframe"]
//! protect_client_url = "http://localhost:8080/"
//! debug = true
//! log_level = "debug"
//!
//! [error_log]
//! enabled = true
//! include_stack = false
//! ```
//!
//! # Serde default values
//!
//! Every field is optional.  Fields annotated with
//! `#[serde(default = "some_fn")]` take the value of `some_fn()` when absent,
//! so an empty file (or no file at all) yields [`ProtectSettings::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::domain::PartialConfig;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// No access token was configured anywhere.
    #[error("an access token is required (settings file, --access-token or PROTECT_ACCESS_TOKEN)")]
    MissingAccessToken,
}

// ── Settings schema ───────────────────────────────────────────────────────────

/// Preview binary settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtectSettings {
    /// Protect access token (a UUID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Id of the container the iframe is attached to.
    #[serde(default = "default_attach_to_id")]
    pub attach_to_id: String,
    /// CSS classes for the iframe.
    #[serde(default = "default_class_names")]
    pub class_names: Vec<String>,
    /// Custom Protect Client base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protect_client_url: Option<Url>,
    /// Use the test environment and enable transport logging.
    #[serde(default)]
    pub debug: bool,
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Upload of error-level events to the Protect API.
    #[serde(default)]
    pub error_log: ErrorLogSettings,
}

/// Settings for the error-log sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorLogSettings {
    /// Upload error-level events.
    #[serde(default)]
    pub enabled: bool,
    /// Attach a backtrace to each upload.
    #[serde(default)]
    pub include_stack: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_attach_to_id() -> String {
    "ns8-protect-wrapper".to_string()
}
fn default_class_names() -> Vec<String> {
    vec!["ns8-protect-client-iframe".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProtectSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            attach_to_id: default_attach_to_id(),
            class_names: default_class_names(),
            protect_client_url: None,
            debug: false,
            log_level: default_log_level(),
            error_log: ErrorLogSettings::default(),
        }
    }
}

impl ProtectSettings {
    /// Builds the unvalidated client configuration these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingAccessToken`] if no token is set.
    pub fn to_partial_config(&self) -> Result<PartialConfig, SettingsError> {
        let access_token = self
            .access_token
            .clone()
            .ok_or(SettingsError::MissingAccessToken)?;
        let mut partial = PartialConfig::new(access_token, self.attach_to_id.clone());
        partial.iframe_config.class_names = Some(self.class_names.clone());
        partial.protect_client_url = self.protect_client_url.clone();
        partial.debug = self.debug;
        Ok(partial)
    }
}

/// Loads settings from `path`, returning [`ProtectSettings::default`] if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<ProtectSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProtectSettings::default()),
        Err(e) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
