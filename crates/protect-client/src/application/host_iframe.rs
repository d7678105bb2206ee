//! HostIFrameManager: attaches the Protect Client iframe and routes its messages.
//!
//! # Message flow
//!
//! ```text
//! embedded page ─► transport ─► on_message(envelope)
//!                                   │ decode_envelope
//!                                   ├─ absent / malformed / unknown name ─► error! log, drop
//!                                   └─ CrossDomainMessage { name, data }
//!                                        └─ EventBinding::invoke(name, data)
//!                                             └─ callback error ─► error! log, drop
//! ```
//!
//! Nothing on this path returns an error to the transport.  A misbehaving
//! embedded page can only cost itself the message it just sent.

use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use protect_core::{decode_envelope, IFRAME_ELEMENT_ID};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::domain::EventBinding;
use crate::infrastructure::dom::{DomError, HostDocument, IFrameElement};
use crate::infrastructure::resizer::{
    HostResizer, MessageEnvelope, MessageHandler, ResizedEvent, ResizedHandler, ResizerOptions,
};

/// Minimum content size change, in pixels, before the transport resizes.
pub const RESIZE_TOLERANCE: u32 = 5;

/// Error type for iframe creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IFrameError {
    /// The container the iframe should be appended to does not exist.
    #[error("Could not find element named \"{0}\"")]
    ContainerNotFound(String),

    /// The document rejected an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Everything needed to create one iframe.
#[derive(Debug, Clone)]
pub struct IFrameOptions {
    /// Id of the DOM node the iframe is appended to.
    pub container_id: String,
    /// CSS classes for the iframe element.
    pub class_names: Vec<String>,
    /// The iframe's `src`.
    pub client_url: Url,
    /// Callbacks for messages from the embedded page.
    pub event_binding: EventBinding,
    /// Turns on the transport's own logging.
    pub debug: bool,
}

/// Creates iframes in the host document and wires them to the transport.
#[derive(Clone)]
pub struct HostIFrameManager {
    document: Arc<dyn HostDocument>,
    resizer: Arc<dyn HostResizer>,
}

impl HostIFrameManager {
    /// Creates a manager over the given document and transport.
    pub fn new(document: Arc<dyn HostDocument>, resizer: Arc<dyn HostResizer>) -> Self {
        Self { document, resizer }
    }

    /// Appends a new iframe to `options.container_id` and registers it with
    /// the transport.
    ///
    /// The container is checked before anything is created, so on error the
    /// document and the transport are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IFrameError::ContainerNotFound`] if the container does not
    /// exist.
    pub fn create_iframe(&self, options: IFrameOptions) -> Result<(), IFrameError> {
        let IFrameOptions {
            container_id,
            class_names,
            client_url,
            event_binding,
            debug,
        } = options;

        if !self.document.contains_container(&container_id) {
            return Err(IFrameError::ContainerNotFound(container_id));
        }

        let iframe = IFrameElement::new(IFRAME_ELEMENT_ID, class_names, client_url);
        debug!(container = %container_id, src = %iframe.src, "appending iframe");
        self.document.append_iframe(&container_id, iframe)?;

        let resizer_options = ResizerOptions {
            check_origin: false,
            log: debug,
            tolerance: RESIZE_TOLERANCE,
            on_message: message_handler(event_binding),
            on_resized: resized_handler(Arc::clone(&self.document)),
        };
        self.resizer
            .iframe_resize(resizer_options, &format!("#{IFRAME_ELEMENT_ID}"));
        Ok(())
    }
}

/// Routes one message from the embedded page to its bound callback.
///
/// The callback, if any, is called before this function returns; the returned
/// future waits for its result.  Dropped messages and failed callbacks are
/// logged, so the future always completes with `()`.
pub fn route_message(binding: &EventBinding, message: Option<&Value>) -> BoxFuture<'static, ()> {
    let message = match decode_envelope(message) {
        Ok(message) => message,
        Err(e) => {
            error!("{e}");
            return future::ready(()).boxed();
        }
    };

    let name = message.name;
    let pending = binding.invoke(name, message.data.unwrap_or(Value::Null));
    async move {
        if let Err(e) = pending.await {
            error!(event = %name, "event callback failed: {e:#}");
        }
    }
    .boxed()
}

fn message_handler(binding: EventBinding) -> MessageHandler {
    Arc::new(move |envelope: MessageEnvelope| -> BoxFuture<'static, ()> {
        route_message(&binding, envelope.message.as_ref())
    })
}

fn resized_handler(document: Arc<dyn HostDocument>) -> ResizedHandler {
    Arc::new(move |event: ResizedEvent| {
        let height = format!("{}px", event.height);
        if let Err(e) = document.set_element_height(IFRAME_ELEMENT_ID, &height) {
            error!("failed to resize iframe: {e}");
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
