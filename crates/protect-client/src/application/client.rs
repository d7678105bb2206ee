//! Client: the public façade of the host SDK.
//!
//! A [`Client`] owns one validated [`ClientConfig`] and renders the embedded
//! Protect Client into the host page on request.
//!
//! # Page selection
//!
//! `render` never fails because of the requested page.  Two cases fall back to
//! the dashboard, with an error log:
//!
//! - the page name is not a [`ClientPage`];
//! - the page is `order-details` but no order id was given.
//!
//! # The iframe URL
//!
//! ```text
//! <protect_client_url><page path>?accessToken=<token>&noredirect=1[&hideNavBar=1]
//! ```

use std::sync::Arc;

use protect_core::{ClientPage, EventName};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use super::host_iframe::{HostIFrameManager, IFrameError, IFrameOptions};
use crate::domain::ClientConfig;
use crate::infrastructure::dom::HostDocument;
use crate::infrastructure::resizer::HostResizer;

/// Error type for [`Client`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The iframe could not be attached.
    #[error(transparent)]
    IFrame(#[from] IFrameError),

    /// `trigger` was called with a name outside the event vocabulary.
    #[error("The event named '{0}' is not defined on this client.")]
    UnknownEvent(String),

    /// The bound callback resolved to an error.
    #[error("callback for event '{name}' failed")]
    Callback {
        name: EventName,
        #[source]
        source: anyhow::Error,
    },
}

/// Renders the Protect Client into the host page.
pub struct Client {
    config: ClientConfig,
    iframes: HostIFrameManager,
}

impl Client {
    /// Creates a client that renders into `document` through `resizer`.
    pub fn new(
        config: ClientConfig,
        document: Arc<dyn HostDocument>,
        resizer: Arc<dyn HostResizer>,
    ) -> Self {
        Self {
            config,
            iframes: HostIFrameManager::new(document, resizer),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Renders the page named `page` (the dashboard when `None`).
    ///
    /// `page` accepts canonical names (`"order-details"`) and the older
    /// constant names (`"ORDER_DETAILS"`).  `platform_id` is the order id for
    /// the order details page.  `override_hide_nav_bar` replaces the page's
    /// default navigation bar setting.
    ///
    /// Returns the URL the iframe was pointed at.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::IFrame`] if the configured container does not
    /// exist.
    pub fn render(
        &self,
        page: Option<&str>,
        platform_id: Option<&str>,
        override_hide_nav_bar: Option<bool>,
    ) -> Result<Url, ClientError> {
        let page = match page {
            None => ClientPage::Dashboard,
            Some(name) => name.parse().unwrap_or_else(|e| {
                error!("{e}");
                ClientPage::Dashboard
            }),
        };
        self.render_page(page, platform_id, override_hide_nav_bar)
    }

    /// Renders `page`.  See [`Client::render`].
    pub fn render_page(
        &self,
        page: ClientPage,
        platform_id: Option<&str>,
        override_hide_nav_bar: Option<bool>,
    ) -> Result<Url, ClientError> {
        let page = validate_page(page, platform_id);
        let hide_nav_bar = hide_nav_bar_setting(page, override_hide_nav_bar);
        let client_url = iframe_url(&self.config, page, platform_id.unwrap_or_default(), hide_nav_bar);
        let iframe_config = self.config.iframe_config();

        info!(%page, "rendering Protect Client");
        self.iframes.create_iframe(IFrameOptions {
            container_id: iframe_config.attach_to_id.clone(),
            class_names: iframe_config.class_names.clone(),
            client_url: client_url.clone(),
            event_binding: self.config.event_binding().clone(),
            debug: self.config.debug(),
        })?;
        Ok(client_url)
    }

    /// Invokes the callback bound to `event_name` with `data` and returns its
    /// result.
    ///
    /// # Errors
    ///
    /// - [`ClientError::UnknownEvent`] if `event_name` is not in the event
    ///   vocabulary.
    /// - [`ClientError::Callback`] if the callback resolves to an error.
    pub async fn trigger(&self, event_name: &str, data: Value) -> Result<Value, ClientError> {
        let name: EventName = event_name
            .parse()
            .map_err(|_| ClientError::UnknownEvent(event_name.to_string()))?;
        self.trigger_event(name, data).await
    }

    /// Typed form of [`Client::trigger`].
    pub async fn trigger_event(&self, name: EventName, data: Value) -> Result<Value, ClientError> {
        self.config
            .event_binding()
            .invoke(name, data)
            .await
            .map_err(|source| ClientError::Callback { name, source })
    }
}

// ── Page helpers ──────────────────────────────────────────────────────────────

/// Falls back to the dashboard when the order details page has no order id.
fn validate_page(page: ClientPage, platform_id: Option<&str>) -> ClientPage {
    if page.requires_order_id() && platform_id.map_or(true, str::is_empty) {
        error!("must pass orderId for ClientPage.ORDER_DETAILS");
        return ClientPage::Dashboard;
    }
    page
}

fn hide_nav_bar_setting(page: ClientPage, override_hide_nav_bar: Option<bool>) -> bool {
    override_hide_nav_bar.unwrap_or_else(|| page.hides_nav_bar_by_default())
}

/// Builds the iframe `src` for `page` from the configured base URL.
fn iframe_url(config: &ClientConfig, page: ClientPage, order_id: &str, hide_nav_bar: bool) -> Url {
    let mut url = config.protect_client_url().clone();
    url.set_path(&page.path(order_id));
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("accessToken", config.access_token());
        query.append_pair("noredirect", "1");
        if hide_nav_bar {
            query.append_pair("hideNavBar", "1");
        }
    }
    url
}

// ── Tests ─────────────────────────────────────────────────────────────────────
