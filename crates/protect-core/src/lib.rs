//! # protect-core
//!
//! Shared vocabulary for the Protect Client iframe protocol.
//!
//! The Protect Client SDK embeds a single-page application in a host page via
//! an `<iframe>`.  The host page and the embedded page run in two separate
//! browsing contexts with no shared memory; the only thing they share is the
//! vocabulary defined in this crate.  Both `protect-client` (host side) and
//! `protect-child` (embedded side) depend on it, so a name that is accepted on
//! one side is always accepted on the other.
//!
//! It has zero dependencies on DOM APIs, transports, or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! ```text
//! host page                                   embedded page
//! ─────────                                   ─────────────
//! protect-client ──► transport (postMessage) ──► protect-child
//!        ▲                                           │
//!        └────────── CrossDomainMessage ◄────────────┘
//! ```
//!
//! - **`protocol`** – What travels across the iframe boundary: the closed set
//!   of [`EventName`]s, the [`CrossDomainMessage`] value, and the rules for
//!   decoding an incoming envelope.
//!
//! - **`domain`** – Pure data both sides agree on: the routable
//!   [`ClientPage`]s and their URL paths, and the [`ParentPageInfo`] geometry
//!   snapshot the host sends to the embedded page.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `protect_core::EventName` instead of `protect_core::protocol::events::EventName`.
pub use domain::geometry::{current_min_iframe_height, ParentPageInfo, DEFAULT_IFRAME_HEIGHT};
pub use domain::page::{decode_order_id, encode_order_id, ClientPage, OrderIdError, UnknownPage};
pub use protocol::envelope::{decode_envelope, MessageError};
pub use protocol::events::{
    CrossDomainMessage, EventName, UnknownEventName, IFRAME_ELEMENT_ID, IFRAME_PAGE_INFO_EVENT_NAME,
    LAST_PAGE_INFO_GLOBAL,
};
