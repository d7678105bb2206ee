//! Protect Client preview: entry point.
//!
//! Renders a Protect Client page into an in-memory host document and prints
//! the resulting iframe markup and `src`.  Useful for checking what a given
//! access token, page and base URL produce without a browser.
//!
//! # Usage
//!
//! ```text
//! protect-client [OPTIONS]
//!
//! Options:
//!   --settings <PATH>            Settings file [default: protect-client.toml]
//!   --access-token <UUID>        Protect access token
//!   --protect-client-url <URL>   Custom Protect Client base URL
//!   --debug                      Use the test environment
//!   --attach-to-id <ID>          Container id for the iframe
//!   --page <PAGE>                Page to render [default: dashboard]
//!   --order-id <ID>              Order id for the order-details page
//!   --hide-nav-bar <BOOL>        Override the page's nav bar default
//!   --report-errors              Upload error-level events to the Protect API
//!   --simulate-connect           Deliver a connected message after rendering
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable               | Description                   |
//! |------------------------|-------------------------------|
//! | `PROTECT_SETTINGS`     | Settings file path            |
//! | `PROTECT_ACCESS_TOKEN` | Protect access token          |
//! | `PROTECT_CLIENT_URL`   | Custom base URL               |
//! | `PROTECT_DEBUG`        | Use the test environment      |
//! | `RUST_LOG`             | Log filter (overrides `log_level`) |
//!
//! CLI arguments take precedence over environment variables, which take
//! precedence over the settings file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use protect_core::{EventName, IFRAME_ELEMENT_ID};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use url::Url;

use protect_client::infrastructure::dom::MemoryDocument;
use protect_client::infrastructure::error_log::{configure_error_log, ErrorLogLayer, ErrorLogOptions};
use protect_client::infrastructure::resizer::{InMemoryResizer, MessageEnvelope};
use protect_client::infrastructure::settings::{load_settings, ProtectSettings};
use protect_client::{event_callback, Client, ClientConfig, PartialEventBinding};

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Command-line arguments for the preview binary.
#[derive(Debug, Parser)]
#[command(
    name = "protect-client",
    about = "Preview the Protect Client iframe a host page would render",
    version
)]
struct Cli {
    /// Path to the TOML settings file.  A missing file means defaults.
    #[arg(long, default_value = "protect-client.toml", env = "PROTECT_SETTINGS")]
    settings: PathBuf,

    /// Protect access token (UUID).
    #[arg(long, env = "PROTECT_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// Custom Protect Client base URL.  Must have path `/`.
    #[arg(long, env = "PROTECT_CLIENT_URL")]
    protect_client_url: Option<Url>,

    /// Use the test environment and enable transport logging.
    #[arg(long, env = "PROTECT_DEBUG")]
    debug: bool,

    /// Id of the container the iframe is attached to.
    #[arg(long)]
    attach_to_id: Option<String>,

    /// Page to render, e.g. `dashboard`, `order-details`, `rules`.
    #[arg(long)]
    page: Option<String>,

    /// Order id for the `order-details` page.
    #[arg(long)]
    order_id: Option<String>,

    /// Override the page's navigation bar default.
    #[arg(long)]
    hide_nav_bar: Option<bool>,

    /// Upload error-level events to the Protect error-log endpoint.
    #[arg(long)]
    report_errors: bool,

    /// After rendering, deliver a connected message through the transport.
    #[arg(long)]
    simulate_connect: bool,
}

impl Cli {
    /// Overlays the CLI arguments on `settings`.
    fn apply_to(&self, mut settings: ProtectSettings) -> ProtectSettings {
        if let Some(token) = &self.access_token {
            settings.access_token = Some(token.clone());
        }
        if let Some(url) = &self.protect_client_url {
            settings.protect_client_url = Some(url.clone());
        }
        if let Some(id) = &self.attach_to_id {
            settings.attach_to_id = id.clone();
        }
        settings.debug |= self.debug;
        settings.error_log.enabled |= self.report_errors;
        settings
    }
}

/// Builds the validated client configuration, with a callback that logs the
/// connected signal.
fn build_config(settings: &ProtectSettings) -> anyhow::Result<ClientConfig> {
    let mut partial = settings.to_partial_config()?;
    partial.event_binding = PartialEventBinding::new()
        .on(
            EventName::ProtectClientConnected,
            event_callback(|_| async {
                info!("embedded Protect Client connected");
                Ok(Value::Null)
            }),
        )
        .on(
            EventName::OrderDetailNameClick,
            event_callback(|data| async move {
                info!(%data, "order name clicked");
                Ok(Value::Null)
            }),
        );
    ClientConfig::new(partial).context("invalid Protect Client configuration")
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed and laid over the settings file.
/// 2. The settings are validated into a [`ClientConfig`].
/// 3. Logging is initialised.  The filter comes from `RUST_LOG`, falling back
///    to the settings' `log_level`; the error-log layer is added when enabled.
/// 4. The requested page is rendered into a [`MemoryDocument`] and the
///    container markup and iframe `src` are printed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.settings)
        .with_context(|| format!("failed to load settings from {}", cli.settings.display()))?;
    let settings = cli.apply_to(settings);
    let config = build_config(&settings)?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    let error_layer: Option<ErrorLogLayer> = if settings.error_log.enabled {
        let options = ErrorLogOptions {
            include_stack: settings.error_log.include_stack,
            ..ErrorLogOptions::default()
        };
        Some(configure_error_log(options, &config).context("failed to set up error log upload")?)
    } else {
        None
    };
    let sink = error_layer.as_ref().map(|layer| layer.sink().clone());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .with(error_layer)
        .init();

    info!(base = %config.protect_client_url(), "Protect Client preview starting");

    // ── Render ────────────────────────────────────────────────────────────────
    let container_id = config.iframe_config().attach_to_id.clone();
    let document = Arc::new(MemoryDocument::new().with_container(container_id.clone()));
    let resizer = Arc::new(InMemoryResizer::new());
    let client = Client::new(config, document.clone(), resizer.clone());

    let src = client
        .render(cli.page.as_deref(), cli.order_id.as_deref(), cli.hide_nav_bar)
        .context("failed to render the Protect Client")?;

    if cli.simulate_connect {
        simulate_connect(&resizer).await;
    }

    if let Some(markup) = document.outer_html(&container_id) {
        println!("{markup}");
    }
    println!("{src}");

    if let Some(sink) = sink {
        sink.close().await;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Plays the embedded page announcing itself.  Returns `false` if no iframe
/// was registered with the transport.
async fn simulate_connect(resizer: &InMemoryResizer) -> bool {
    let selector = format!("#{IFRAME_ELEMENT_ID}");
    let message = json!({ "name": EventName::ProtectClientConnected });
    let delivered = resizer.deliver(&selector, MessageEnvelope::new(message)).await;
    if !delivered {
        warn!(%selector, "no iframe registered; connected message not delivered");
    }
    delivered
}
