//! Routable views inside the embedded Protect Client application.
//!
//! The host chooses which view the iframe opens on by building the iframe's
//! `src` path from a [`ClientPage`].  The embedded application maps the path
//! back with [`ClientPage::resolve_path`].
//!
//! # Order ids in the path
//!
//! The order-details view needs the platform's order id, which may contain
//! characters that are not safe in a URL path (`#`, `?`, `/`, non-ASCII, ...).
//! The id is therefore carried as standard base64 of its UTF-8 bytes.  Base64
//! can itself produce `/`, so that one character is percent-encoded as `%2F`,
//! keeping the encoded id inside a single path segment.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Percent-encoded form of `/` inside an encoded order id.
const ENCODED_SLASH: &str = "%2F";

const ORDER_DETAILS_PREFIX: &str = "/order-details/";

/// Page routes within the Protect Client application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientPage {
    /// Landing page.  The default when no page (or an invalid one) is requested.
    Dashboard,
    /// A single order.  Requires a non-empty platform order id.
    OrderDetails,
    /// The order rules editor.
    #[serde(rename = "rules")]
    OrderRules,
    /// The suspicious orders report.
    SuspiciousOrders,
    /// The campaign activity report.
    CampaignActivity,
    /// The monitors overview.
    Monitors,
}

impl ClientPage {
    /// Every page, in declaration order.
    pub const ALL: [ClientPage; 6] = [
        ClientPage::Dashboard,
        ClientPage::OrderDetails,
        ClientPage::OrderRules,
        ClientPage::SuspiciousOrders,
        ClientPage::CampaignActivity,
        ClientPage::Monitors,
    ];

    /// Canonical name of the page, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            ClientPage::Dashboard => "dashboard",
            ClientPage::OrderDetails => "order-details",
            ClientPage::OrderRules => "rules",
            ClientPage::SuspiciousOrders => "suspicious-orders",
            ClientPage::CampaignActivity => "campaign-activity",
            ClientPage::Monitors => "monitors",
        }
    }

    /// Older SDK builds named pages with their constant identifiers
    /// (`ORDER_DETAILS`, `ORDER_RULES`, ...).  Both spellings are accepted.
    const fn legacy_name(self) -> &'static str {
        match self {
            ClientPage::Dashboard => "DASHBOARD",
            ClientPage::OrderDetails => "ORDER_DETAILS",
            ClientPage::OrderRules => "ORDER_RULES",
            ClientPage::SuspiciousOrders => "SUSPICIOUS_ORDERS",
            ClientPage::CampaignActivity => "CAMPAIGN_ACTIVITY",
            ClientPage::Monitors => "MONITORS",
        }
    }

    /// Returns the URL path for this page.
    ///
    /// `order_id` is only used by [`ClientPage::OrderDetails`]; every other
    /// page ignores it.
    pub fn path(self, order_id: &str) -> String {
        match self {
            ClientPage::Dashboard => "/".to_string(),
            ClientPage::OrderDetails => format!("{ORDER_DETAILS_PREFIX}{}", encode_order_id(order_id)),
            ClientPage::OrderRules => "/rules".to_string(),
            ClientPage::SuspiciousOrders => "/report/suspicious-orders".to_string(),
            ClientPage::CampaignActivity => "/report/campaign-activity".to_string(),
            ClientPage::Monitors => "/monitors".to_string(),
        }
    }

    /// Whether the embedded application hides its navigation bar on this page
    /// unless the caller says otherwise.
    ///
    /// The dashboard and the two main reports are full views with navigation;
    /// everything else is shown as a focused view.
    pub const fn hides_nav_bar_by_default(self) -> bool {
        !matches!(
            self,
            ClientPage::Dashboard | ClientPage::SuspiciousOrders | ClientPage::OrderRules
        )
    }

    /// Whether this page cannot be shown without an order id.
    pub const fn requires_order_id(self) -> bool {
        matches!(self, ClientPage::OrderDetails)
    }

    /// Maps a URL path back to the page it was built from.
    ///
    /// Returns the page and, for order details, the decoded order id.  Returns
    /// `None` for unknown paths and for order-details paths whose id does not
    /// decode.
    pub fn resolve_path(path: &str) -> Option<(ClientPage, Option<String>)> {
        if let Some(segment) = path.strip_prefix(ORDER_DETAILS_PREFIX) {
            if segment.is_empty() || segment.contains('/') {
                return None;
            }
            let order_id = decode_order_id(segment).ok()?;
            return Some((ClientPage::OrderDetails, Some(order_id)));
        }

        ClientPage::ALL
            .into_iter()
            .filter(|page| !page.requires_order_id())
            .find(|page| page.path("") == path)
            .map(|page| (page, None))
    }
}

impl fmt::Display for ClientPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that does not name any [`ClientPage`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ClientPage: \"{0}\"")]
pub struct UnknownPage(pub String);

impl FromStr for ClientPage {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientPage::ALL
            .into_iter()
            .find(|page| page.as_str() == s || page.legacy_name() == s)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

// ── Order id encoding ─────────────────────────────────────────────────────────

/// Failure to recover an order id from its path encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderIdError {
    /// The segment is not valid base64.
    #[error("order id segment is not valid base64: {0}")]
    Base64(String),

    /// The decoded bytes are not valid UTF-8.
    #[error("order id is not valid UTF-8")]
    Utf8,
}

/// Encodes an order id so it occupies exactly one URL path segment.
pub fn encode_order_id(order_id: &str) -> String {
    STANDARD.encode(order_id.as_bytes()).replace('/', ENCODED_SLASH)
}

/// Reverses [`encode_order_id`].
///
/// # Errors
///
/// Returns [`OrderIdError`] if the segment is not base64 or does not decode to
/// UTF-8 text.
pub fn decode_order_id(segment: &str) -> Result<String, OrderIdError> {
    let base64 = segment.replace(ENCODED_SLASH, "/").replace("%2f", "/");
    let bytes = STANDARD
        .decode(base64.as_bytes())
        .map_err(|e| OrderIdError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| OrderIdError::Utf8)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
