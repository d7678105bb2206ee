//! The embedded page's window, behind traits.
//!
//! Inside the iframe the bridge needs a handful of window capabilities: the
//! transport's configuration slot, the transport's handle to the parent page,
//! element measurement, DOM events, and two well-known globals.
//! [`ChildWindow`] and [`ParentIFrame`] name exactly those.
//!
//! # The configuration slot
//!
//! The transport's child-side script looks for a configuration object on the
//! window when it loads.  Writing that object is the only global mutation the
//! bridge performs, and it happens in one place:
//! [`ChildWindow::install_resizer_config`].
//!
//! # Testability
//!
//! [`memory::MemoryWindow`] and [`memory::MemoryParent`] implement the traits
//! in memory.  Unit tests additionally mock [`ParentIFrame`] with `mockall`.

use std::fmt;
use std::sync::Arc;

use protect_core::{CrossDomainMessage, ParentPageInfo};
use serde_json::Value;

use crate::application::bridge::BridgeError;

pub mod memory;

pub use memory::{MemoryParent, MemoryWindow};

/// Returns the height the iframe should currently have, in CSS pixels.
pub type HeightCalculation = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Called by the transport once it has connected to the parent page.
pub type ReadyHandler = Arc<dyn Fn() -> Result<(), BridgeError> + Send + Sync>;

/// Called by the transport for every message from the parent page.
pub type ParentMessageHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Called with every geometry snapshot the parent page sends.
pub type PageInfoCallback = Box<dyn Fn(ParentPageInfo) + Send + Sync>;

/// Listener for a DOM custom event.  Receives the event's `detail`.
pub type DomEventListener = Arc<dyn Fn(Value) + Send + Sync>;

/// The object written into the transport's configuration slot.
#[derive(Clone)]
pub struct ResizerConfig {
    /// Overrides the transport's own height measurement.
    pub height_calculation_method: HeightCalculation,
    /// Readiness callback.
    pub on_ready: ReadyHandler,
    /// Parent-to-child message callback.
    pub on_message: ParentMessageHandler,
}

impl fmt::Debug for ResizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizerConfig").finish_non_exhaustive()
    }
}

/// The transport's handle to the parent page (`window.parentIFrame`).
#[cfg_attr(test, mockall::automock)]
pub trait ParentIFrame: Send + Sync {
    /// Posts `message` to the host page.
    fn send_message(&self, message: CrossDomainMessage);

    /// Asks the host page for its geometry.  `callback` runs for the first
    /// snapshot and again whenever the host scrolls or resizes.
    fn get_page_info(&self, callback: PageInfoCallback);
}

/// The window capabilities the bridge uses.
pub trait ChildWindow: Send + Sync {
    /// Writes the transport's configuration slot.
    fn install_resizer_config(&self, config: ResizerConfig);

    /// The transport's parent handle, once it exists.
    fn parent_iframe(&self) -> Option<Arc<dyn ParentIFrame>>;

    /// Height of the element with `element_id`
    /// (`getBoundingClientRect().height`), or `None` if there is no such element.
    fn element_height(&self, element_id: &str) -> Option<f64>;

    /// Subscribes `listener` to the document event `event_name`.
    fn add_event_listener(&self, event_name: &str, listener: DomEventListener);

    /// Dispatches a custom event on the document.
    fn dispatch_event(&self, event_name: &str, detail: Value);

    /// Writes a window global.
    fn set_global(&self, key: &str, value: Value);

    /// Reads a window global.
    fn global(&self, key: &str) -> Option<Value>;
}
