//! The event vocabulary shared by the host page and the embedded page.
//!
//! Every message that crosses the iframe boundary carries an [`EventName`].
//! The set is closed: a name that is not listed here is rejected by the host
//! with a diagnostic and never delivered to a callback.  Keeping this enum in
//! one crate that both sides depend on is what guarantees the two sides agree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Well-known names ──────────────────────────────────────────────────────────

/// Name of the DOM custom event the embedded page dispatches whenever a new
/// [`ParentPageInfo`](crate::ParentPageInfo) snapshot arrives from the host.
///
/// The event detail is `{ "pageInfo": <ParentPageInfo> }`.
pub const IFRAME_PAGE_INFO_EVENT_NAME: &str = "iframe-resize-page-info";

/// Global key under which the embedded page caches the most recent
/// [`ParentPageInfo`](crate::ParentPageInfo) snapshot.
pub const LAST_PAGE_INFO_GLOBAL: &str = "__latestIframePageInfo";

/// DOM id given to the `<iframe>` element the host creates.
///
/// The transport locates the iframe through the selector `#<IFRAME_ELEMENT_ID>`.
pub const IFRAME_ELEMENT_ID: &str = "ns8-protect-client-iframe";

// ── EventName ─────────────────────────────────────────────────────────────────

/// Events that the embedded Protect Client can raise towards the host page.
///
/// # Serde representation
///
/// Each variant serializes as its wire name:
///
/// ```json
/// "ns8-protect-client-connected"
/// "order-detail-name-click"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventName {
    /// The embedded page finished initializing and found its parent handle.
    ///
    /// Always the first message sent on a page load.
    #[serde(rename = "ns8-protect-client-connected")]
    ProtectClientConnected,

    /// The user clicked an order name inside the embedded page.
    ///
    /// The payload carries whatever the embedded application attached to the
    /// DOM event (typically the order's platform id).
    #[serde(rename = "order-detail-name-click")]
    OrderDetailNameClick,
}

impl EventName {
    /// Every event in the vocabulary, in declaration order.
    pub const ALL: [EventName; 2] = [EventName::ProtectClientConnected, EventName::OrderDetailNameClick];

    /// Events the embedded page forwards from local DOM events.
    ///
    /// The connected signal is not listed: the bridge sends it itself when
    /// the transport reports readiness.
    pub const FORWARDED: [EventName; 1] = [EventName::OrderDetailNameClick];

    /// Number of events in the vocabulary.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the wire name of this event.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventName::ProtectClientConnected => "ns8-protect-client-connected",
            EventName::OrderDetailNameClick => "order-detail-name-click",
        }
    }

    /// Dense index of this event in [`EventName::ALL`].
    ///
    /// Used to store one value per event in a fixed-size array.
    pub const fn index(self) -> usize {
        match self {
            EventName::ProtectClientConnected => 0,
            EventName::OrderDetailNameClick => 1,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that is not a member of the [`EventName`] vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event name \"{0}\"")]
pub struct UnknownEventName(pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_string()))
    }
}

// ── CrossDomainMessage ────────────────────────────────────────────────────────

/// A single message passed across the iframe boundary.
///
/// `data` is opaque to the transport and both bridges; only the callback bound
/// to `name` interprets it.
///
/// # Serde representation
///
/// ```json
/// {"name":"ns8-protect-client-connected"}
/// {"name":"order-detail-name-click","data":"100000042"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDomainMessage {
    /// Which event this message represents.
    pub name: EventName,

    /// Optional event payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CrossDomainMessage {
    /// Creates a message with no payload.
    pub fn new(name: EventName) -> Self {
        Self { name, data: None }
    }

    /// Creates a message carrying `data`.
    pub fn with_data(name: EventName, data: serde_json::Value) -> Self {
        Self { name, data: Some(data) }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
