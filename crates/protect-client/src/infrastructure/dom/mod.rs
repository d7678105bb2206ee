//! The host page's DOM, behind a trait.
//!
//! The host SDK only ever does three things to the host document: check that a
//! container exists, append an `<iframe>` to it, and change the iframe's inline
//! height.  [`HostDocument`] names exactly those operations so the rest of the
//! crate never touches a browser global.
//!
//! # Testability
//!
//! [`memory::MemoryDocument`] keeps the document in memory.  The preview binary
//! renders into it, and every test in this crate uses it in place of a browser.

use thiserror::Error;
use url::Url;

pub mod memory;

pub use memory::MemoryDocument;

/// Error type for DOM operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// No element with the given id exists in the document.
    #[error("Could not find element named \"{0}\"")]
    ElementNotFound(String),
}

/// An `<iframe>` element as created by the host SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IFrameElement {
    /// Element id.  The transport locates the iframe through it.
    pub id: String,
    /// Entries of the element's `classList`, in insertion order.
    pub class_names: Vec<String>,
    /// The `src` attribute.
    pub src: Url,
    /// Inline `style.height`, once the transport has reported a size.
    pub height: Option<String>,
}

impl IFrameElement {
    /// Creates an iframe element with no inline height.
    pub fn new(id: impl Into<String>, class_names: Vec<String>, src: Url) -> Self {
        Self {
            id: id.into(),
            class_names,
            src,
            height: None,
        }
    }

    /// Serializes the element the way `outerHTML` would.
    pub fn outer_html(&self) -> String {
        let mut html = format!("<iframe id=\"{}\"", escape_attr(&self.id));
        if !self.class_names.is_empty() {
            html.push_str(&format!(" class=\"{}\"", escape_attr(&self.class_names.join(" "))));
        }
        html.push_str(&format!(" src=\"{}\"", escape_attr(self.src.as_str())));
        if let Some(height) = &self.height {
            html.push_str(&format!(" style=\"height: {}\"", escape_attr(height)));
        }
        html.push_str("></iframe>");
        html
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The subset of the host document the SDK manipulates.
///
/// Implementations must be usable from transport callbacks, hence
/// `Send + Sync`.
pub trait HostDocument: Send + Sync {
    /// Returns `true` if an element with `id` exists and can hold children.
    ///
    /// An iframe is not a container: appending into one is never valid.
    fn contains_container(&self, id: &str) -> bool;

    /// Appends `iframe` as the last child of the element with `container_id`.
    fn append_iframe(&self, container_id: &str, iframe: IFrameElement) -> Result<(), DomError>;

    /// Sets the inline CSS height of the element with `element_id`.
    fn set_element_height(&self, element_id: &str, height: &str) -> Result<(), DomError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
