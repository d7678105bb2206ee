//! End-to-end tests for the host SDK: render into an in-memory document, then
//! play the embedded page through the in-memory transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use protect_client::infrastructure::dom::MemoryDocument;
use protect_client::infrastructure::resizer::{InMemoryResizer, MessageEnvelope, ResizedEvent};
use protect_client::{
    event_callback, Client, ClientConfig, ClientError, IFrameError, PartialConfig,
    PartialEventBinding,
};
use protect_core::{ClientPage, EventName, IFRAME_ELEMENT_ID};
use serde_json::{json, Value};

const TOKEN: &str = "27802062-34c4-450c-a18f-667324f14375";
const SELECTOR: &str = "#ns8-protect-client-iframe";

struct Harness {
    document: Arc<MemoryDocument>,
    resizer: Arc<InMemoryResizer>,
    client: Client,
}

fn harness(attach_to_id: &str, binding: PartialEventBinding) -> Harness {
    let mut partial = PartialConfig::new(TOKEN, attach_to_id);
    partial.iframe_config.class_names = Some(vec!["x".to_string()]);
    partial.event_binding = binding;
    let config = ClientConfig::new(partial).expect("valid config");

    let document = Arc::new(MemoryDocument::new().with_container("app"));
    let resizer = Arc::new(InMemoryResizer::new());
    let client = Client::new(config, document.clone(), resizer.clone());
    Harness {
        document,
        resizer,
        client,
    }
}

fn counting(counter: &Arc<AtomicUsize>) -> protect_client::EventCallback {
    let counter = Arc::clone(counter);
    event_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(Value::Null) }
    })
}

#[test]
fn test_render_attaches_iframe_with_classes_and_token() {
    // Arrange
    let h = harness("app", PartialEventBinding::new());

    // Act
    h.client.render(None, None, None).expect("render");

    // Assert
    let children = h.document.children_of("app");
    assert_eq!(children.len(), 1);
    let iframe = &children[0];
    assert_eq!(iframe.class_names, vec!["x".to_string()]);
    assert!(iframe.src.as_str().starts_with("https://protect-client.luddites.me/"));
    assert!(iframe
        .src
        .as_str()
        .contains("accessToken=27802062-34c4-450c-a18f-667324f14375"));
}

#[test]
fn test_render_into_missing_container_fails_without_iframe() {
    // Arrange
    let h = harness("missing", PartialEventBinding::new());

    // Act
    let result = h.client.render(None, None, None);

    // Assert
    assert!(matches!(
        result,
        Err(ClientError::IFrame(IFrameError::ContainerNotFound(ref id))) if id == "missing"
    ));
    assert!(h.document.element(IFRAME_ELEMENT_ID).is_none());
    assert_eq!(h.resizer.registration_count(), 0);
}

#[test]
fn test_order_details_without_id_renders_dashboard() {
    let first = harness("app", PartialEventBinding::new());
    let second = harness("app", PartialEventBinding::new());

    first.client.render_page(ClientPage::OrderDetails, None, None).unwrap();
    second.client.render_page(ClientPage::Dashboard, None, None).unwrap();

    assert_eq!(
        first.document.outer_html("app"),
        second.document.outer_html("app")
    );
}

#[test]
fn test_order_id_in_src_resolves_back_on_embedded_side() {
    let h = harness("app", PartialEventBinding::new());

    let src = h
        .client
        .render(Some("order-details"), Some("#1001/ünïcødé"), None)
        .unwrap();

    assert_eq!(
        ClientPage::resolve_path(src.path()),
        Some((ClientPage::OrderDetails, Some("#1001/ünïcødé".to_string())))
    );
}

#[tokio::test]
async fn test_connected_message_reaches_bound_callback_once() {
    // Arrange
    let connected = Arc::new(AtomicUsize::new(0));
    let clicked = Arc::new(AtomicUsize::new(0));
    let h = harness(
        "app",
        PartialEventBinding::new()
            .on(EventName::ProtectClientConnected, counting(&connected))
            .on(EventName::OrderDetailNameClick, counting(&clicked)),
    );
    h.client.render(None, None, None).unwrap();

    // Act
    let envelope = MessageEnvelope::new(json!({"name": "ns8-protect-client-connected"}));
    assert!(h.resizer.deliver(SELECTOR, envelope).await);

    // Assert
    assert_eq!(connected.load(Ordering::SeqCst), 1);
    assert_eq!(clicked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_message_is_dropped_and_channel_stays_open() {
    // Arrange
    let connected = Arc::new(AtomicUsize::new(0));
    let h = harness(
        "app",
        PartialEventBinding::new().on(EventName::ProtectClientConnected, counting(&connected)),
    );
    h.client.render(None, None, None).unwrap();

    // Act: garbage first, then a legitimate message.
    h.resizer
        .deliver(SELECTOR, MessageEnvelope::new(json!({"name": "connected"})))
        .await;
    h.resizer.deliver(SELECTOR, MessageEnvelope::default()).await;
    h.resizer
        .deliver(
            SELECTOR,
            MessageEnvelope::new(json!({"name": "ns8-protect-client-connected"})),
        )
        .await;

    // Assert
    assert_eq!(connected.load(Ordering::SeqCst), 1);
}

#[test]
fn test_child_resize_updates_iframe_height() {
    let h = harness("app", PartialEventBinding::new());
    h.client.render(None, None, None).unwrap();

    h.resizer.report_resize(SELECTOR, ResizedEvent { height: 1024.0, width: 800.0 });

    let iframe = h.document.element(IFRAME_ELEMENT_ID).unwrap();
    assert_eq!(iframe.height.as_deref(), Some("1024px"));
}

#[tokio::test]
async fn test_trigger_resolves_to_callback_value() {
    let h = harness(
        "app",
        PartialEventBinding::new().on(
            EventName::ProtectClientConnected,
            event_callback(|_| async { Ok(json!(42)) }),
        ),
    );

    let value = h
        .client
        .trigger("ns8-protect-client-connected", Value::Null)
        .await
        .unwrap();
    assert_eq!(value, json!(42));

    let err = h.client.trigger("nonexistent", Value::Null).await.unwrap_err();
    assert!(matches!(err, ClientError::UnknownEvent(_)));
}
