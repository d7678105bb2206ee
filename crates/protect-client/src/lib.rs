//! protect-client library crate.
//!
//! This crate is the host-side half of the Protect Client SDK.  It embeds the
//! Protect Client application into a host page via an `<iframe>` and routes
//! the events the embedded page raises to callbacks supplied by the host.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host page code
//!         ↓  ClientConfig, Client::render / Client::trigger
//! [protect-client]
//!   ├── domain/           Validated ClientConfig, total EventBinding
//!   ├── application/      Client façade, HostIFrameManager, message routing
//!   └── infrastructure/
//!         ├── dom/        HostDocument seam + in-memory document
//!         ├── resizer/    HostResizer seam (the iframe transport) + in-memory transport
//!         ├── error_log/  tracing Layer that POSTs errors to the Protect API
//!         ├── tracking/   Tracking script loader
//!         └── settings/   TOML settings for the preview binary
//!         ↕  postMessage (performed by the transport, never by this crate)
//! Embedded Protect Client (protect-child)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async runtime.
//! - `application` depends on `domain`, `protect-core`, and the infrastructure
//!   *traits* only; it never names a concrete document or transport.
//! - `infrastructure` provides the trait definitions and their concrete
//!   implementations.
//!
//! # Why traits for the DOM and the transport?
//!
//! The browser's `document` and the transport library's global
//! `iFrameResize` function are process-wide globals.  Passing them in as
//! [`HostDocument`](infrastructure::dom::HostDocument) and
//! [`HostResizer`](infrastructure::resizer::HostResizer) trait objects keeps
//! every piece of routing logic testable without a browser, and confines the
//! global access to one adapter per global.

/// Domain layer: validated configuration and event bindings (no I/O).
pub mod domain;

/// Application layer: the `Client` façade and iframe lifecycle management.
pub mod application;

/// Infrastructure layer: DOM and transport seams, error-log sink, settings.
pub mod infrastructure;

pub use application::{Client, ClientError, HostIFrameManager, IFrameError, IFrameOptions};
pub use domain::{
    event_callback, ClientConfig, ConfigError, EventBinding, EventCallback, IFrameConfig,
    PartialConfig, PartialEventBinding, PartialIFrameConfig,
};
