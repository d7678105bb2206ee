//! Application layer of the child bridge.
//!
//! - **`bridge`** – The [`ChildBridge`](bridge::ChildBridge) state machine:
//!   registration with the transport, iframe height calculation, the
//!   readiness handshake, event forwarding, and geometry caching.  It talks
//!   to the page only through the
//!   [`ChildWindow`](crate::infrastructure::window::ChildWindow) and
//!   [`ParentIFrame`](crate::infrastructure::window::ParentIFrame) traits.

pub mod bridge;
