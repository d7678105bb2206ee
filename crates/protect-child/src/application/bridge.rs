//! ChildBridge: connects the embedded page to the host through the transport.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──register()──► Registered ──on_ready()──► Ready
//!                                    ▲            │
//!                                    └── Err ─────┘  (no parent handle)
//! ```
//!
//! - **register** writes a [`ResizerConfig`] into the transport's slot.  From
//!   then on the transport asks the bridge for the iframe height and tells it
//!   when it is ready.
//! - **on_ready** sends the connected signal, starts forwarding user events to
//!   the host, and subscribes to the host's geometry.
//! - Messages from the host are announced as DOM events prefixed with
//!   [`PARENT_MESSAGE_EVENT_PREFIX`], never under the names that are forwarded.
//!
//! # Height
//!
//! The iframe is always at least as tall as the distance from its visible top
//! to the bottom of the host window, so a modal opened inside it is visible
//! without scrolling the host page.  Before the first geometry snapshot
//! arrives that minimum is [`DEFAULT_IFRAME_HEIGHT`](protect_core::DEFAULT_IFRAME_HEIGHT).
//!
//! The callbacks installed in the transport hold only a weak reference to the
//! bridge.  Dropping the bridge turns them into no-ops.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use protect_core::{
    current_min_iframe_height, decode_envelope, CrossDomainMessage, EventName, ParentPageInfo,
    DEFAULT_IFRAME_HEIGHT, IFRAME_PAGE_INFO_EVENT_NAME, LAST_PAGE_INFO_GLOBAL,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::infrastructure::window::{ChildWindow, ParentIFrame, ResizerConfig};

/// Prefix of the DOM events that carry messages from the parent page.
pub const PARENT_MESSAGE_EVENT_PREFIX: &str = "ns8-protect-parent:";

/// Error type for the child bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The container to measure does not exist.
    #[error("Could not find element named \"{0}\"")]
    ContainerNotFound(String),

    /// The transport reported readiness but exposes no parent handle.
    #[error("`onReady()` called, but `parentIFrame == null`")]
    ProtocolViolation,

    /// Readiness was signalled before the bridge registered with the transport.
    #[error("bridge has not been registered with the transport")]
    NotRegistered,

    /// The bridge was dropped before the transport called back.
    #[error("bridge has been dropped")]
    Detached,
}

/// Where the bridge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Attached to a container, nothing installed yet.
    Uninitialized,
    /// Configuration installed; waiting for the transport.
    Registered,
    /// Connected to the host.
    Ready,
}

struct BridgeInner {
    window: Arc<dyn ChildWindow>,
    container_id: String,
    state: Mutex<BridgeState>,
}

/// The embedded page's side of the iframe protocol.
#[derive(Clone)]
pub struct ChildBridge {
    inner: Arc<BridgeInner>,
}

impl ChildBridge {
    /// Creates a bridge that sizes the iframe after the element `container_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ContainerNotFound`] if the element does not exist.
    pub fn attach(
        window: Arc<dyn ChildWindow>,
        container_id: impl Into<String>,
    ) -> Result<Self, BridgeError> {
        let container_id = container_id.into();
        if window.element_height(&container_id).is_none() {
            return Err(BridgeError::ContainerNotFound(container_id));
        }
        Ok(Self {
            inner: Arc::new(BridgeInner {
                window,
                container_id,
                state: Mutex::new(BridgeState::Uninitialized),
            }),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        *self.inner.state()
    }

    /// Installs the bridge's callbacks in the transport's configuration slot.
    ///
    /// Registering again reinstalls the callbacks and keeps the current state
    /// if the bridge is already ready.
    pub fn register(&self) {
        let weak = Arc::downgrade(&self.inner);
        let config = ResizerConfig {
            height_calculation_method: {
                let weak = Weak::clone(&weak);
                Arc::new(move || {
                    weak.upgrade()
                        .map_or(DEFAULT_IFRAME_HEIGHT, |inner| inner.calculate_height())
                })
            },
            on_ready: {
                let weak = Weak::clone(&weak);
                Arc::new(move || -> Result<(), BridgeError> {
                    let inner = weak.upgrade().ok_or(BridgeError::Detached)?;
                    inner.on_ready()
                })
            },
            on_message: Arc::new(move |message: Value| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_parent_message(message);
                }
            }),
        };

        self.inner.window.install_resizer_config(config);
        let mut state = self.inner.state();
        if *state == BridgeState::Uninitialized {
            *state = BridgeState::Registered;
        }
        debug!(container = %self.inner.container_id, "resizer config installed");
    }

    /// The height the iframe should have right now.
    pub fn calculate_height(&self) -> f64 {
        self.inner.calculate_height()
    }

    /// Handles the transport's readiness signal.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotRegistered`] if [`ChildBridge::register`] was not called.
    /// - [`BridgeError::ProtocolViolation`] if there is no parent handle.  The
    ///   bridge stays `Registered`.
    pub fn on_ready(&self) -> Result<(), BridgeError> {
        self.inner.on_ready()
    }

    /// Handles a message from the parent page.
    pub fn on_parent_message(&self, message: Value) {
        self.inner.on_parent_message(message);
    }

    /// The most recent geometry snapshot from the host, if any.
    pub fn page_info(&self) -> Option<ParentPageInfo> {
        self.inner.page_info()
    }
}

impl BridgeInner {
    fn state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn page_info(&self) -> Option<ParentPageInfo> {
        let cached = self.window.global(LAST_PAGE_INFO_GLOBAL)?;
        match serde_json::from_value(cached) {
            Ok(info) => Some(info),
            Err(e) => {
                debug!("ignoring unreadable {LAST_PAGE_INFO_GLOBAL}: {e}");
                None
            }
        }
    }

    fn calculate_height(&self) -> f64 {
        let content = self.window.element_height(&self.container_id).unwrap_or(0.0);
        content.max(current_min_iframe_height(self.page_info().as_ref()))
    }

    fn on_ready(&self) -> Result<(), BridgeError> {
        // The guard is held for the whole handshake so concurrent readiness
        // signals connect exactly once.
        let mut state = self.state();
        match *state {
            BridgeState::Uninitialized => return Err(BridgeError::NotRegistered),
            BridgeState::Ready => {
                debug!("transport signalled readiness again; already connected");
                return Ok(());
            }
            BridgeState::Registered => {}
        }

        let parent = self
            .window
            .parent_iframe()
            .ok_or(BridgeError::ProtocolViolation)?;

        // The connected signal goes out before any listener can forward an event.
        parent.send_message(CrossDomainMessage::new(EventName::ProtectClientConnected));

        for name in EventName::FORWARDED {
            let parent = Arc::clone(&parent);
            self.window.add_event_listener(
                name.as_str(),
                Arc::new(move |detail: Value| forward_event(parent.as_ref(), name, detail)),
            );
        }

        // The window holds the parent and the parent holds this callback.
        let window = Arc::downgrade(&self.window);
        parent.get_page_info(Box::new(move |info: ParentPageInfo| {
            if let Some(window) = window.upgrade() {
                publish_page_info(window.as_ref(), info);
            }
        }));

        *state = BridgeState::Ready;
        info!("connected to host page");
        Ok(())
    }

    fn on_parent_message(&self, message: Value) {
        match decode_envelope(Some(&message)) {
            Ok(message) => {
                let detail = message.data.unwrap_or(Value::Null);
                self.window
                    .dispatch_event(&parent_message_event_name(message.name), detail);
            }
            Err(e) => error!("dropping message from parent page: {e}"),
        }
    }
}

/// DOM event name under which a message from the parent page is announced.
///
/// Forward listeners subscribe to the bare event names, so a parent message
/// is never echoed back to the host.
pub fn parent_message_event_name(name: EventName) -> String {
    format!("{PARENT_MESSAGE_EVENT_PREFIX}{}", name.as_str())
}

fn forward_event(parent: &dyn ParentIFrame, name: EventName, detail: Value) {
    let message = if detail.is_null() {
        CrossDomainMessage::new(name)
    } else {
        CrossDomainMessage::with_data(name, detail)
    };
    parent.send_message(message);
}

/// Caches `info` in the well-known global and announces it to page code.
fn publish_page_info(window: &dyn ChildWindow, info: ParentPageInfo) {
    let value = match serde_json::to_value(info) {
        Ok(value) => value,
        Err(e) => {
            error!("failed to encode page info: {e}");
            return;
        }
    };
    window.set_global(LAST_PAGE_INFO_GLOBAL, value.clone());

    let mut detail = Map::new();
    detail.insert("pageInfo".to_string(), value);
    window.dispatch_event(IFRAME_PAGE_INFO_EVENT_NAME, Value::Object(detail));
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::window::{MemoryParent, MemoryWindow, MockParentIFrame, PageInfoCallback};
    use mockall::predicate::eq;
    use serde_json::json;

    const CONTAINER: &str = "protect-app";

    fn info(offset_top: f64, scroll_top: f64, window_height: f64) -> ParentPageInfo {
        ParentPageInfo {
            iframe_height: 0.0,
            iframe_width: 0.0,
            offset_left: 0.0,
            offset_top,
            scroll_left: 0.0,
            scroll_top,
            document_height: 0.0,
            document_width: 0.0,
            window_height,
            window_width: 0.0,
        }
    }

    fn window_with_content(height: f64) -> Arc<MemoryWindow> {
        Arc::new(MemoryWindow::new().with_element(CONTAINER, height))
    }

    #[test]
    fn test_attach_requires_container() {
        let window = Arc::new(MemoryWindow::new());
        let result = ChildBridge::attach(window, "missing");
        assert!(matches!(result, Err(BridgeError::ContainerNotFound(ref id)) if id == "missing"));
    }

    #[test]
    fn test_register_installs_config_and_advances_state() {
        // Arrange
        let window = window_with_content(100.0);
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        assert_eq!(bridge.state(), BridgeState::Uninitialized);

        // Act
        bridge.register();

        // Assert
        assert!(window.resizer_config().is_some());
        assert_eq!(bridge.state(), BridgeState::Registered);
    }

    #[test]
    fn test_height_defaults_to_600_for_short_content() {
        let window = window_with_content(120.0);
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();

        assert_eq!(window.calculate_height(), Some(600.0));
    }

    #[test]
    fn test_height_follows_tall_content() {
        let window = window_with_content(2400.0);
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();

        assert_eq!(window.calculate_height(), Some(2400.0));
    }

    #[test]
    fn test_height_uses_cached_page_info() {
        // Arrange: iframe top is 200px below the window top in a 900px window.
        let window = window_with_content(100.0);
        window.set_global(
            LAST_PAGE_INFO_GLOBAL,
            serde_json::to_value(info(300.0, 100.0, 900.0)).unwrap(),
        );
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();

        // Act / Assert
        assert_eq!(bridge.calculate_height(), 700.0);
    }

    #[test]
    fn test_unreadable_cached_page_info_is_ignored() {
        let window = window_with_content(100.0);
        window.set_global(LAST_PAGE_INFO_GLOBAL, json!("garbage"));
        let bridge = ChildBridge::attach(window, CONTAINER).unwrap();
        assert_eq!(bridge.page_info(), None);
        assert_eq!(bridge.calculate_height(), 600.0);
    }

    #[test]
    fn test_ready_without_parent_is_a_protocol_violation() {
        // Arrange
        let window = window_with_content(100.0);
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();

        // Act
        let result = window.fire_ready();

        // Assert
        assert_eq!(result, Err(BridgeError::ProtocolViolation));
        assert_eq!(bridge.state(), BridgeState::Registered);
    }

    #[test]
    fn test_ready_before_register_is_rejected() {
        let bridge = ChildBridge::attach(window_with_content(1.0), CONTAINER).unwrap();
        assert_eq!(bridge.on_ready(), Err(BridgeError::NotRegistered));
    }

    #[test]
    fn test_ready_sends_connected_then_requests_page_info() {
        // Arrange: the mock checks the exact calls the bridge makes.
        let mut parent = MockParentIFrame::new();
        let mut seq = mockall::Sequence::new();
        parent
            .expect_send_message()
            .with(eq(CrossDomainMessage::new(EventName::ProtectClientConnected)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        parent
            .expect_get_page_info()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let window = window_with_content(100.0);
        window.set_parent(Some(Arc::new(parent)));
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();

        // Act
        window.fire_ready().unwrap();

        // Assert
        assert_eq!(bridge.state(), BridgeState::Ready);
        for name in EventName::FORWARDED {
            assert_eq!(window.listener_count(name.as_str()), 1);
        }
    }

    #[test]
    fn test_forwarded_dom_event_carries_detail() {
        // Arrange
        let mut parent = MockParentIFrame::new();
        parent
            .expect_send_message()
            .with(eq(CrossDomainMessage::new(EventName::ProtectClientConnected)))
            .times(1)
            .return_const(());
        parent
            .expect_send_message()
            .with(eq(CrossDomainMessage::with_data(
                EventName::OrderDetailNameClick,
                json!("100000042"),
            )))
            .times(1)
            .return_const(());
        parent.expect_get_page_info().return_const(());
        let window = window_with_content(100.0);
        window.set_parent(Some(Arc::new(parent)));
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();
        window.fire_ready().unwrap();

        // Act
        window.emit("order-detail-name-click", json!("100000042"));
    }

    #[test]
    fn test_page_info_is_cached_and_redispatched() {
        // Arrange: capture the callback the bridge hands to the parent.
        let captured: Arc<Mutex<Option<PageInfoCallback>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&captured);
        let mut parent = MockParentIFrame::new();
        parent.expect_send_message().return_const(());
        parent
            .expect_get_page_info()
            .times(1)
            .returning(move |callback| *slot.lock().unwrap() = Some(callback));
        let window = window_with_content(100.0);
        window.set_parent(Some(Arc::new(parent)));
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();
        window.fire_ready().unwrap();

        // Act
        let snapshot = info(0.0, 0.0, 1000.0);
        (captured.lock().unwrap().as_ref().unwrap())(snapshot);

        // Assert
        assert_eq!(bridge.page_info(), Some(snapshot));
        assert_eq!(window.calculate_height(), Some(1000.0));
        let (name, detail) = window.dispatched_events().pop().unwrap();
        assert_eq!(name, IFRAME_PAGE_INFO_EVENT_NAME);
        assert_eq!(detail["pageInfo"]["windowHeight"], json!(1000.0));
    }

    #[test]
    fn test_parent_message_is_redispatched_as_dom_event() {
        let window = window_with_content(100.0);
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();

        window.receive_from_parent(json!({"name": "order-detail-name-click", "data": {"id": 7}}));
        window.receive_from_parent(json!({"name": "not-an-event"}));

        assert_eq!(
            window.dispatched_events(),
            vec![("ns8-protect-parent:order-detail-name-click".to_string(), json!({"id": 7}))]
        );
    }

    #[test]
    fn test_parent_message_is_not_echoed_back_to_host() {
        // Arrange
        let parent = Arc::new(MemoryParent::new());
        let window = Arc::new(
            MemoryWindow::new()
                .with_element(CONTAINER, 100.0)
                .with_parent(parent.clone()),
        );
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();
        window.fire_ready().unwrap();

        // Act: the host sends an event that the child would otherwise forward.
        window.receive_from_parent(json!({"name": "order-detail-name-click", "data": 7}));

        // Assert
        assert_eq!(
            parent.sent_messages(),
            vec![CrossDomainMessage::new(EventName::ProtectClientConnected)]
        );
        assert_eq!(
            window.dispatched_events().last().map(|(name, _)| name.clone()),
            Some(parent_message_event_name(EventName::OrderDetailNameClick))
        );
    }

    #[test]
    fn test_page_info_subscription_does_not_keep_window_alive() {
        // Arrange
        let parent = Arc::new(MemoryParent::new());
        let window = Arc::new(
            MemoryWindow::new()
                .with_element(CONTAINER, 100.0)
                .with_parent(parent.clone()),
        );
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();
        window.fire_ready().unwrap();
        let weak_window = Arc::downgrade(&window);

        // Act
        drop(bridge);
        drop(window);

        // Assert: the window is freed and late geometry is ignored.
        assert!(weak_window.upgrade().is_none());
        parent.push_page_info(info(0.0, 0.0, 800.0));
    }

    #[test]
    fn test_concurrent_ready_signals_connect_once() {
        // Arrange
        let parent = Arc::new(MemoryParent::new());
        let window = Arc::new(
            MemoryWindow::new()
                .with_element(CONTAINER, 100.0)
                .with_parent(parent.clone()),
        );
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();
        let barrier = Arc::new(std::sync::Barrier::new(8));

        // Act
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bridge = bridge.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    bridge.on_ready()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(()));
        }

        // Assert
        assert_eq!(parent.sent_messages().len(), 1);
        for name in EventName::FORWARDED {
            assert_eq!(window.listener_count(name.as_str()), 1);
        }
    }

    #[test]
    fn test_dropped_bridge_leaves_inert_callbacks() {
        let window = window_with_content(100.0);
        let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
        bridge.register();
        drop(bridge);

        assert_eq!(window.calculate_height(), Some(DEFAULT_IFRAME_HEIGHT));
        assert_eq!(window.fire_ready(), Err(BridgeError::Detached));
    }
}
