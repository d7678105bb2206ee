//! In-memory window and parent handle.
//!
//! [`MemoryWindow`] stands in for the embedded page's `window`;
//! [`MemoryParent`] stands in for the transport's parent handle.  Together
//! they let a test drive the whole bridge lifecycle: fire readiness, push
//! geometry, emit user events, and inspect what reached the host.
//!
//! No lock is held while a listener or callback runs, so callbacks are free
//! to call back into the window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use protect_core::{CrossDomainMessage, ParentPageInfo};
use serde_json::Value;

use super::{ChildWindow, DomEventListener, PageInfoCallback, ParentIFrame, ResizerConfig};
use crate::application::bridge::BridgeError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── MemoryWindow ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct WindowState {
    resizer_config: Option<ResizerConfig>,
    parent: Option<Arc<dyn ParentIFrame>>,
    element_heights: HashMap<String, f64>,
    listeners: HashMap<String, Vec<DomEventListener>>,
    dispatched: Vec<(String, Value)>,
    globals: HashMap<String, Value>,
}

/// A window held entirely in memory.
#[derive(Default)]
pub struct MemoryWindow {
    state: Mutex<WindowState>,
}

impl MemoryWindow {
    /// Creates a window with no elements, no parent and no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the window with an element `id` of the given height.
    pub fn with_element(self, id: impl Into<String>, height: f64) -> Self {
        self.set_element_height(id, height);
        self
    }

    /// Returns the window with `parent` as the transport's parent handle.
    pub fn with_parent(self, parent: Arc<dyn ParentIFrame>) -> Self {
        self.set_parent(Some(parent));
        self
    }

    /// Adds or resizes an element.
    pub fn set_element_height(&self, id: impl Into<String>, height: f64) {
        lock(&self.state).element_heights.insert(id.into(), height);
    }

    /// Sets or clears the parent handle.
    pub fn set_parent(&self, parent: Option<Arc<dyn ParentIFrame>>) {
        lock(&self.state).parent = parent;
    }

    /// The configuration installed in the transport's slot, if any.
    pub fn resizer_config(&self) -> Option<ResizerConfig> {
        lock(&self.state).resizer_config.clone()
    }

    /// Plays the transport signalling readiness.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotRegistered`] if no configuration was
    /// installed, otherwise whatever the installed `on_ready` returns.
    pub fn fire_ready(&self) -> Result<(), BridgeError> {
        let config = self.resizer_config().ok_or(BridgeError::NotRegistered)?;
        (config.on_ready)()
    }

    /// Plays the transport asking for the content height.
    pub fn calculate_height(&self) -> Option<f64> {
        self.resizer_config()
            .map(|config| (config.height_calculation_method)())
    }

    /// Plays the transport delivering a message from the parent page.
    ///
    /// Returns `false` if no configuration was installed.
    pub fn receive_from_parent(&self, message: Value) -> bool {
        match self.resizer_config() {
            Some(config) => {
                (config.on_message)(message);
                true
            }
            None => false,
        }
    }

    /// Plays page code dispatching a DOM custom event.
    pub fn emit(&self, event_name: &str, detail: Value) {
        self.dispatch_event(event_name, detail);
    }

    /// Every event dispatched so far, oldest first.
    pub fn dispatched_events(&self) -> Vec<(String, Value)> {
        lock(&self.state).dispatched.clone()
    }

    /// Number of listeners subscribed to `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        lock(&self.state)
            .listeners
            .get(event_name)
            .map_or(0, Vec::len)
    }
}

impl ChildWindow for MemoryWindow {
    fn install_resizer_config(&self, config: ResizerConfig) {
        lock(&self.state).resizer_config = Some(config);
    }

    fn parent_iframe(&self) -> Option<Arc<dyn ParentIFrame>> {
        lock(&self.state).parent.clone()
    }

    fn element_height(&self, element_id: &str) -> Option<f64> {
        lock(&self.state).element_heights.get(element_id).copied()
    }

    fn add_event_listener(&self, event_name: &str, listener: DomEventListener) {
        lock(&self.state)
            .listeners
            .entry(event_name.to_string())
            .or_default()
            .push(listener);
    }

    fn dispatch_event(&self, event_name: &str, detail: Value) {
        let listeners = {
            let mut state = lock(&self.state);
            state.dispatched.push((event_name.to_string(), detail.clone()));
            state.listeners.get(event_name).cloned().unwrap_or_default()
        };
        for listener in listeners {
            listener(detail.clone());
        }
    }

    fn set_global(&self, key: &str, value: Value) {
        lock(&self.state).globals.insert(key.to_string(), value);
    }

    fn global(&self, key: &str) -> Option<Value> {
        lock(&self.state).globals.get(key).cloned()
    }
}

// ── MemoryParent ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct ParentState {
    sent: Vec<CrossDomainMessage>,
    page_info_callbacks: Vec<Arc<dyn Fn(ParentPageInfo) + Send + Sync>>,
}

/// A parent handle that records outgoing messages and lets the caller push
/// geometry snapshots.
#[derive(Default)]
pub struct MemoryParent {
    state: Mutex<ParentState>,
}

impl MemoryParent {
    /// Creates a parent handle with nothing sent and nobody waiting for geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent to the host so far, oldest first.
    pub fn sent_messages(&self) -> Vec<CrossDomainMessage> {
        lock(&self.state).sent.clone()
    }

    /// Delivers `info` to every `get_page_info` callback.
    pub fn push_page_info(&self, info: ParentPageInfo) {
        let callbacks = lock(&self.state).page_info_callbacks.clone();
        for callback in callbacks {
            callback(info);
        }
    }
}

impl ParentIFrame for MemoryParent {
    fn send_message(&self, message: CrossDomainMessage) {
        lock(&self.state).sent.push(message);
    }

    fn get_page_info(&self, callback: PageInfoCallback) {
        lock(&self.state).page_info_callbacks.push(Arc::from(callback));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
