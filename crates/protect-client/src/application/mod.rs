//! Application layer of the host SDK.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (validated configuration, event bindings) and the infrastructure (the
//! browser document, the iframe transport).  Code here:
//!
//! - **Orchestrates** domain objects to fulfil a caller goal (e.g., "show the
//!   order details page for order 42").
//! - **Depends on abstractions**: it talks to the document through
//!   [`HostDocument`](crate::infrastructure::dom::HostDocument) and to the
//!   transport through [`HostResizer`](crate::infrastructure::resizer::HostResizer).
//! - **Performs no browser calls of its own**.
//!
//! # Sub-modules
//!
//! - **`host_iframe`** – Creates the `<iframe>`, wires it to the transport,
//!   and routes every message the embedded page sends to the bound callback.
//!   A malformed or unknown message is logged and dropped here; it never
//!   reaches the caller.
//!
//! - **`client`** – The public façade: picks the page, builds the iframe URL,
//!   and lets callers fire a bound callback by hand with `trigger`.

pub mod client;
pub mod host_iframe;

pub use client::{Client, ClientError};
pub use host_iframe::{route_message, HostIFrameManager, IFrameError, IFrameOptions, RESIZE_TOLERANCE};
