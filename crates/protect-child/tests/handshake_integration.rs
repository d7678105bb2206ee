//! End-to-end tests for the child bridge: a full page load against an
//! in-memory window and parent handle.

use std::sync::Arc;

use protect_child::{BridgeError, BridgeState, ChildBridge, MemoryParent, MemoryWindow};
use protect_core::{
    CrossDomainMessage, EventName, ParentPageInfo, IFRAME_PAGE_INFO_EVENT_NAME,
    LAST_PAGE_INFO_GLOBAL,
};
use protect_child::{ChildWindow, ParentIFrame};
use serde_json::json;

const CONTAINER: &str = "root";

fn geometry(offset_top: f64, scroll_top: f64, window_height: f64) -> ParentPageInfo {
    ParentPageInfo {
        iframe_height: 600.0,
        iframe_width: 800.0,
        offset_left: 0.0,
        offset_top,
        scroll_left: 0.0,
        scroll_top,
        document_height: 3000.0,
        document_width: 1280.0,
        window_height,
        window_width: 1280.0,
    }
}

fn loaded_page() -> (Arc<MemoryWindow>, Arc<MemoryParent>, ChildBridge) {
    let parent = Arc::new(MemoryParent::new());
    let window = Arc::new(
        MemoryWindow::new()
            .with_element(CONTAINER, 250.0)
            .with_parent(parent.clone()),
    );
    let bridge = ChildBridge::attach(window.clone(), CONTAINER).expect("container exists");
    bridge.register();
    (window, parent, bridge)
}

#[test]
fn test_full_page_load() {
    // Arrange
    let (window, parent, bridge) = loaded_page();
    assert_eq!(window.calculate_height(), Some(600.0));

    // Act: transport ready, host sends geometry, user clicks an order name.
    window.fire_ready().expect("parent handle present");
    parent.push_page_info(geometry(150.0, 50.0, 1000.0));
    window.emit("order-detail-name-click", json!("100000042"));

    // Assert
    assert_eq!(bridge.state(), BridgeState::Ready);
    assert_eq!(
        parent.sent_messages(),
        vec![
            CrossDomainMessage::new(EventName::ProtectClientConnected),
            CrossDomainMessage::with_data(EventName::OrderDetailNameClick, json!("100000042")),
        ]
    );
    assert_eq!(window.calculate_height(), Some(900.0));
    assert!(window.global(LAST_PAGE_INFO_GLOBAL).is_some());
    assert!(window
        .dispatched_events()
        .iter()
        .any(|(name, detail)| name == IFRAME_PAGE_INFO_EVENT_NAME
            && detail["pageInfo"]["offsetTop"] == json!(150.0)));
}

#[test]
fn test_connected_is_first_message() {
    let (window, parent, _bridge) = loaded_page();

    window.fire_ready().unwrap();
    window.emit("order-detail-name-click", json!(1));
    window.emit("order-detail-name-click", json!(2));

    let sent = parent.sent_messages();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].name, EventName::ProtectClientConnected);
    assert!(sent[1..].iter().all(|m| m.name == EventName::OrderDetailNameClick));
}

#[test]
fn test_events_before_ready_are_not_forwarded() {
    let (window, parent, _bridge) = loaded_page();

    window.emit("order-detail-name-click", json!(1));

    assert!(parent.sent_messages().is_empty());
}

#[test]
fn test_repeated_ready_does_not_duplicate_listeners() {
    let (window, parent, _bridge) = loaded_page();

    window.fire_ready().unwrap();
    window.fire_ready().unwrap();
    window.emit("order-detail-name-click", json!(1));

    assert_eq!(parent.sent_messages().len(), 2);
}

#[test]
fn test_missing_parent_is_fatal_until_parent_appears() {
    // Arrange: no parent handle yet.
    let window = Arc::new(MemoryWindow::new().with_element(CONTAINER, 10.0));
    let bridge = ChildBridge::attach(window.clone(), CONTAINER).unwrap();
    bridge.register();

    // Act / Assert
    assert_eq!(window.fire_ready(), Err(BridgeError::ProtocolViolation));
    assert_eq!(bridge.state(), BridgeState::Registered);

    let parent = Arc::new(MemoryParent::new());
    window.set_parent(Some(parent.clone() as Arc<dyn ParentIFrame>));
    window.fire_ready().unwrap();
    assert_eq!(bridge.state(), BridgeState::Ready);
    assert_eq!(parent.sent_messages().len(), 1);
}

#[test]
fn test_geometry_updates_replace_the_cached_snapshot() {
    let (window, parent, bridge) = loaded_page();
    window.fire_ready().unwrap();

    parent.push_page_info(geometry(0.0, 0.0, 700.0));
    parent.push_page_info(geometry(0.0, 0.0, 1100.0));

    assert_eq!(bridge.page_info().map(|p| p.window_height), Some(1100.0));
    assert_eq!(window.calculate_height(), Some(1100.0));
}
