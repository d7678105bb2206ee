//! In-memory [`HostResizer`] used by the preview binary and by tests.
//!
//! Registrations are kept per selector.  Tests play the part of the embedded
//! page by calling [`InMemoryResizer::deliver`] and
//! [`InMemoryResizer::report_resize`], which invoke the registered callbacks
//! exactly as the real transport would.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{HostResizer, MessageEnvelope, ResizedEvent, ResizerOptions};

/// A transport that records registrations and lets callers drive them.
#[derive(Debug, Default)]
pub struct InMemoryResizer {
    registrations: Mutex<HashMap<String, ResizerOptions>>,
}

impl InMemoryResizer {
    /// Creates a transport with no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the options registered for `selector`, if any.
    pub fn options_for(&self, selector: &str) -> Option<ResizerOptions> {
        self.lock().get(selector).cloned()
    }

    /// Number of selectors currently wired.
    pub fn registration_count(&self) -> usize {
        self.lock().len()
    }

    /// Delivers `envelope` to the `on_message` handler registered for
    /// `selector` and waits for it to finish.
    ///
    /// Returns `false` if nothing is registered for `selector`.
    pub async fn deliver(&self, selector: &str, envelope: MessageEnvelope) -> bool {
        // The lock is released before the handler runs.
        let Some(options) = self.options_for(selector) else {
            return false;
        };
        (options.on_message)(envelope).await;
        true
    }

    /// Reports a size change to the `on_resized` handler registered for
    /// `selector`.
    ///
    /// Returns `false` if nothing is registered for `selector`.
    pub fn report_resize(&self, selector: &str, event: ResizedEvent) -> bool {
        let Some(options) = self.options_for(selector) else {
            return false;
        };
        (options.on_resized)(event);
        true
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ResizerOptions>> {
        self.registrations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostResizer for InMemoryResizer {
    fn iframe_resize(&self, options: ResizerOptions, selector: &str) {
        debug!(selector, ?options, "iframe wired to transport");
        self.lock().insert(selector.to_string(), options);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::{self, BoxFuture};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_options(messages: Arc<AtomicUsize>, resizes: Arc<AtomicUsize>) -> ResizerOptions {
        ResizerOptions {
            check_origin: false,
            log: false,
            tolerance: 5,
            on_message: Arc::new(move |_envelope: MessageEnvelope| -> BoxFuture<'static, ()> {
                messages.fetch_add(1, Ordering::SeqCst);
                Box::pin(future::ready(()))
            }),
            on_resized: Arc::new(move |_event: ResizedEvent| {
                resizes.fetch_add(1, Ordering::SeqCst);
            }),
        }
    }

    #[tokio::test]
    async fn test_deliver_invokes_registered_handler() {
        // Arrange
        let resizer = InMemoryResizer::new();
        let messages = Arc::new(AtomicUsize::new(0));
        let resizes = Arc::new(AtomicUsize::new(0));
        resizer.iframe_resize(counting_options(Arc::clone(&messages), Arc::clone(&resizes)), "#f");

        // Act
        let delivered = resizer.deliver("#f", MessageEnvelope::new(json!({}))).await;

        // Assert
        assert!(delivered);
        assert_eq!(messages.load(Ordering::SeqCst), 1);
        assert_eq!(resizes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_deliver_to_unknown_selector_reports_false() {
        let resizer = InMemoryResizer::new();
        assert!(!resizer.deliver("#nothing", MessageEnvelope::default()).await);
    }

    #[test]
    fn test_report_resize_invokes_registered_handler() {
        let resizer = InMemoryResizer::new();
        let messages = Arc::new(AtomicUsize::new(0));
        let resizes = Arc::new(AtomicUsize::new(0));
        resizer.iframe_resize(counting_options(messages, Arc::clone(&resizes)), "#f");

        assert!(resizer.report_resize("#f", ResizedEvent { height: 10.0, width: 10.0 }));
        assert_eq!(resizes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_replaces_earlier_one_for_same_selector() {
        let resizer = InMemoryResizer::new();
        let counter = || Arc::new(AtomicUsize::new(0));
        resizer.iframe_resize(counting_options(counter(), counter()), "#f");
        let mut second = counting_options(counter(), counter());
        second.tolerance = 9;
        resizer.iframe_resize(second, "#f");

        assert_eq!(resizer.registration_count(), 1);
        assert_eq!(resizer.options_for("#f").unwrap().tolerance, 9);
    }
}
