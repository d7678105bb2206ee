//! Geometry of the host page as seen from the embedded page.
//!
//! The embedded page cannot inspect the host's DOM.  Instead it asks the host
//! (through the transport) for a [`ParentPageInfo`] snapshot, and uses it to
//! make sure the iframe always reaches at least to the bottom of the host's
//! visible window.  That guarantees a modal dialog opened inside the iframe is
//! visible without the user scrolling the host page.

use serde::{Deserialize, Serialize};

/// Height the iframe is given before any host geometry has arrived.
///
/// Large enough to display a modal dialog.
pub const DEFAULT_IFRAME_HEIGHT: f64 = 600.0;

/// Snapshot of the host page's geometry relative to the iframe.
///
/// All values are CSS pixels.  Field names follow the transport's JSON shape
/// (`camelCase`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentPageInfo {
    /// Height of the iframe element.
    pub iframe_height: f64,
    /// Width of the iframe element.
    pub iframe_width: f64,
    /// Distance from the left edge of the host document to the iframe.
    pub offset_left: f64,
    /// Distance from the top edge of the host document to the iframe.
    pub offset_top: f64,
    /// Horizontal scroll position of the host window.
    pub scroll_left: f64,
    /// Vertical scroll position of the host window.
    pub scroll_top: f64,
    /// Host document height (`document.documentElement.clientHeight`).
    pub document_height: f64,
    /// Host document width (`document.documentElement.clientWidth`).
    pub document_width: f64,
    /// Host window height (`window.innerHeight`).
    pub window_height: f64,
    /// Host window width (`window.innerWidth`).
    pub window_width: f64,
}

impl ParentPageInfo {
    /// Distance from the iframe's visible top to the bottom of the host window.
    pub fn distance_to_window_bottom(&self) -> f64 {
        let iframe_top_in_window = self.offset_top - self.scroll_top;
        self.window_height - iframe_top_in_window
    }
}

/// Minimum height the iframe should currently have.
///
/// Returns [`DEFAULT_IFRAME_HEIGHT`] when no snapshot has arrived yet, otherwise
/// `windowHeight - (offsetTop - scrollTop)`.
pub fn current_min_iframe_height(page_info: Option<&ParentPageInfo>) -> f64 {
    page_info.map_or(DEFAULT_IFRAME_HEIGHT, ParentPageInfo::distance_to_window_bottom)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
