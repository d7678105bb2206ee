//! protect-child library crate.
//!
//! Runs inside the embedded Protect Client page and connects it to the host
//! page through the iframe transport.
//!
//! # What does the bridge do? (for beginners)
//!
//! The embedded page lives in its own browsing context.  It cannot call the
//! host page, and the host page cannot call it; a transport library carries
//! messages between the two and keeps the iframe's height in sync with the
//! embedded content.  The bridge:
//!
//! 1. Installs a configuration object the transport picks up when it loads.
//! 2. Tells the transport how tall the iframe should be: the content height,
//!    but never less than what reaches the bottom of the host window.
//! 3. When the transport is ready, announces itself to the host with the
//!    connected signal and forwards user events (such as a click on an order
//!    name) to the host.
//! 4. Caches the host's geometry snapshots and re-announces them to the rest
//!    of the embedded page as a DOM event.
//!
//! # Architecture
//!
//! ```text
//! embedded page code
//!         ↓ ChildBridge::attach / register
//! [protect-child]
//!   ├── application/bridge     State machine and callbacks
//!   └── infrastructure/window  ChildWindow + ParentIFrame seams, in-memory window
//!         ↕ transport (postMessage)
//! host page (protect-client)
//! ```

/// Application layer: the bridge state machine.
pub mod application;

/// Infrastructure layer: window and parent-handle seams.
pub mod infrastructure;

pub use application::bridge::{
    parent_message_event_name, BridgeError, BridgeState, ChildBridge, PARENT_MESSAGE_EVENT_PREFIX,
};
pub use infrastructure::window::{
    ChildWindow, MemoryParent, MemoryWindow, ParentIFrame, ResizerConfig,
};
