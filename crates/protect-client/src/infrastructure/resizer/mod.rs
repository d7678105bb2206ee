//! The host side of the iframe transport, behind a trait.
//!
//! The transport is a third-party library that, once pointed at an iframe,
//! carries messages from the embedded page to the host and reports every size
//! change of the embedded content.  The host SDK never calls `postMessage`
//! itself: it hands the transport a [`ResizerOptions`] with two callbacks and
//! a CSS selector through [`HostResizer::iframe_resize`], and the transport
//! does the rest.
//!
//! # What the callbacks receive
//!
//! ```text
//! embedded page ──postMessage──► transport ──► on_message(MessageEnvelope { message })
//!                                          └─► on_resized(ResizedEvent { height, width })
//! ```
//!
//! `on_message` returns a future.  The transport drives it; the routing logic
//! guarantees it never fails, so one bad message cannot close the channel.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod memory;

pub use memory::InMemoryResizer;

/// The wrapped message the transport passes to `on_message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// The value the embedded page sent.  Untrusted and possibly absent.
    #[serde(default)]
    pub message: Option<Value>,
}

impl MessageEnvelope {
    /// Wraps `message` the way the transport does.
    pub fn new(message: Value) -> Self {
        Self {
            message: Some(message),
        }
    }
}

/// Size report the transport passes to `on_resized`, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizedEvent {
    /// New content height.
    pub height: f64,
    /// New content width.
    pub width: f64,
}

/// Handler for incoming messages.  The returned future must not fail.
pub type MessageHandler = Arc<dyn Fn(MessageEnvelope) -> BoxFuture<'static, ()> + Send + Sync>;

/// Handler for size reports.
pub type ResizedHandler = Arc<dyn Fn(ResizedEvent) + Send + Sync>;

/// Options passed to the transport when wiring an iframe.
#[derive(Clone)]
pub struct ResizerOptions {
    /// Whether the transport restricts messages to the iframe's origin.
    pub check_origin: bool,
    /// Whether the transport logs its own activity.
    pub log: bool,
    /// Minimum size change, in pixels, that triggers a resize.
    pub tolerance: u32,
    /// Called for every message from the embedded page.
    pub on_message: MessageHandler,
    /// Called whenever the embedded content changes size.
    pub on_resized: ResizedHandler,
}

impl fmt::Debug for ResizerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizerOptions")
            .field("check_origin", &self.check_origin)
            .field("log", &self.log)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

/// The transport's host-side entry point (`iFrameResize(options, selector)`).
pub trait HostResizer: Send + Sync {
    /// Wires the iframe matching `selector` to `options`.
    fn iframe_resize(&self, options: ResizerOptions, selector: &str);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
