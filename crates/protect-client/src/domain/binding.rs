//! Event callbacks and the total event binding.
//!
//! An [`EventBinding`] maps *every* [`EventName`] to exactly one callback.
//! Callers supply the ones they care about through a [`PartialEventBinding`];
//! every event they leave out gets a callback that resolves immediately with
//! `null`.  Because the binding is a fixed-size array indexed by the enum,
//! "no callback for this event" is not a state the host can ever reach.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use protect_core::EventName;
use serde_json::Value;

/// Future returned by an [`EventCallback`].
pub type EventFuture = BoxFuture<'static, anyhow::Result<Value>>;

/// A host-supplied handler for one event.
///
/// Receives the event's payload (`null` when the message carried none) and
/// returns a future with the handler's result.
pub type EventCallback = Arc<dyn Fn(Value) -> EventFuture + Send + Sync>;

/// Wraps an async closure as an [`EventCallback`].
///
/// # Example
///
/// ```rust
/// use protect_client::event_callback;
///
/// let on_connected = event_callback(|_data| async { Ok(serde_json::json!(42)) });
/// ```
pub fn event_callback<F, Fut>(f: F) -> EventCallback
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(move |data: Value| -> EventFuture { Box::pin(f(data)) })
}

/// The callback installed for events the caller did not bind.
fn noop_callback() -> EventCallback {
    Arc::new(|_data: Value| -> EventFuture { Box::pin(future::ready(Ok(Value::Null))) })
}

// ── PartialEventBinding ───────────────────────────────────────────────────────

/// The callbacks a caller chose to supply.  Any subset of events.
#[derive(Clone, Default)]
pub struct PartialEventBinding {
    callbacks: HashMap<EventName, EventCallback>,
}

impl PartialEventBinding {
    /// Creates an empty partial binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `callback` to `name`, replacing any earlier binding.
    pub fn on(mut self, name: EventName, callback: EventCallback) -> Self {
        self.callbacks.insert(name, callback);
        self
    }

    /// Returns the callback bound to `name`, if any.
    pub fn get(&self, name: EventName) -> Option<&EventCallback> {
        self.callbacks.get(&name)
    }
}

impl fmt::Debug for PartialEventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<_> = self.callbacks.keys().collect();
        bound.sort();
        f.debug_struct("PartialEventBinding").field("bound", &bound).finish()
    }
}

// ── EventBinding ──────────────────────────────────────────────────────────────

/// One callback for every [`EventName`].
///
/// Built once by [`ClientConfig`](super::ClientConfig) and never mutated.
/// Cloning is cheap: only the `Arc`s are cloned.
#[derive(Clone)]
pub struct EventBinding {
    callbacks: [EventCallback; EventName::COUNT],
}

impl EventBinding {
    /// Fills in a no-op callback for every event `partial` leaves unbound.
    pub fn from_partial(partial: &PartialEventBinding) -> Self {
        let callbacks = EventName::ALL
            .map(|name| partial.get(name).cloned().unwrap_or_else(noop_callback));
        Self { callbacks }
    }

    /// Returns the callback bound to `name`.
    pub fn get(&self, name: EventName) -> &EventCallback {
        &self.callbacks[name.index()]
    }

    /// Calls the callback bound to `name` with `data`.
    ///
    /// The callback runs synchronously up to its first suspension point; the
    /// returned future completes the rest.
    pub fn invoke(&self, name: EventName, data: Value) -> EventFuture {
        (self.get(name))(data)
    }
}

impl Default for EventBinding {
    fn default() -> Self {
        Self::from_partial(&PartialEventBinding::default())
    }
}

impl fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("events", &EventName::ALL)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
