//! Voice-driven flow integration tests
//!
//! Feeds transcripts through the controller and asserts the same state
//! machine moves as click input would produce. No speech-to-text is
//! involved; transcripts arrive as plain text.

use std::sync::Arc;
use std::time::Duration;

use aura_pairing::{Action, Screen};

mod common;
use common::{MockTransport, PairScript, bt_device, settle, test_controller, wait_for_screen};

#[tokio::test]
async fn headphone_utterance_starts_a_bluetooth_scan() {
    let transport = MockTransport::new();
    let (controller, _) = test_controller(transport);
    controller.open_modal();

    let action = controller.handle_voice("connect to my headphone");
    assert_eq!(
        action,
        Some(Action::SelectDeviceType("bluetooth".to_string()))
    );

    // The screen flipped synchronously, before the scan resolves
    let state = controller.store().state();
    assert_eq!(state.current_screen, Screen::Scanning);
    assert_eq!(state.selected_device_type.as_deref(), Some("bluetooth"));
}

#[tokio::test]
async fn numeric_utterance_selects_a_listed_device() {
    let transport = MockTransport::new();
    transport.push_scan_devices(Duration::ZERO, vec![bt_device("1", "Sony WH-1000XM4")]);

    let (controller, _) = test_controller(transport);
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    wait_for_screen(controller.store(), Screen::DeviceList).await;

    let action = controller.handle_voice("connect to device 1");
    assert!(matches!(action, Some(Action::SelectDevice(ref d)) if d.name == "Sony WH-1000XM4"));

    let state = controller.store().state();
    assert_eq!(state.current_screen, Screen::Pairing);
    assert_eq!(state.pairing.expect("pairing session").progress_percent, 0);
}

#[tokio::test]
async fn cancel_closes_from_every_reachable_screen() {
    // Selector
    let (controller, _) = test_controller(MockTransport::new());
    controller.open_modal();
    assert_eq!(controller.handle_voice("cancel"), Some(Action::CloseModal));
    assert!(!controller.store().is_modal_open());

    // Scanning (mid-flight)
    let transport = MockTransport::new();
    transport.push_scan_devices(Duration::from_millis(100), vec![]);
    let (controller, _) = test_controller(transport);
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    assert_eq!(controller.store().screen(), Screen::Scanning);
    assert_eq!(controller.handle_voice("cancel"), Some(Action::CloseModal));
    assert!(!controller.store().is_modal_open());

    // Device list
    let transport = MockTransport::new();
    transport.push_scan_devices(Duration::ZERO, vec![bt_device("1", "JBL Flip")]);
    let (controller, _) = test_controller(transport);
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    wait_for_screen(controller.store(), Screen::DeviceList).await;
    assert_eq!(controller.handle_voice("cancel"), Some(Action::CloseModal));
    assert!(!controller.store().is_modal_open());

    // Error
    let transport = MockTransport::new();
    transport.push_pair(Duration::ZERO, PairScript::Reject("no".to_string()));
    let (controller, _) = test_controller(transport);
    controller.open_modal();
    controller.select_device(bt_device("1", "JBL Flip"));
    wait_for_screen(controller.store(), Screen::Error).await;
    assert_eq!(controller.handle_voice("cancel"), Some(Action::CloseModal));
    assert!(!controller.store().is_modal_open());

    // No devices
    let transport = MockTransport::new();
    transport.push_scan_devices(Duration::ZERO, vec![]);
    let (controller, _) = test_controller(transport);
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    wait_for_screen(controller.store(), Screen::NoDevices).await;
    assert_eq!(controller.handle_voice("cancel"), Some(Action::CloseModal));
    assert!(!controller.store().is_modal_open());
}

#[tokio::test]
async fn scan_again_triggers_a_second_discovery() {
    let transport = MockTransport::new();
    transport.push_scan_devices(Duration::ZERO, vec![bt_device("1", "JBL Flip")]);
    transport.push_scan_devices(Duration::ZERO, vec![bt_device("2", "Sony WH-1000XM4")]);

    let (controller, _) = test_controller(Arc::clone(&transport));
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    wait_for_screen(controller.store(), Screen::DeviceList).await;

    assert_eq!(controller.handle_voice("scan again"), Some(Action::Rescan));
    assert_eq!(controller.store().screen(), Screen::Scanning);

    wait_for_screen(controller.store(), Screen::DeviceList).await;
    assert_eq!(transport.scan_call_count(), 2);
    assert_eq!(controller.store().state().scan.devices[0].id, "2");
}

#[tokio::test]
async fn try_again_rescans_from_no_devices() {
    let transport = MockTransport::new();
    transport.push_scan_devices(Duration::ZERO, vec![]);
    transport.push_scan_devices(Duration::ZERO, vec![bt_device("1", "JBL Flip")]);

    let (controller, _) = test_controller(Arc::clone(&transport));
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    wait_for_screen(controller.store(), Screen::NoDevices).await;

    assert_eq!(controller.handle_voice("try again"), Some(Action::Rescan));
    wait_for_screen(controller.store(), Screen::DeviceList).await;
    assert_eq!(transport.scan_call_count(), 2);
}

#[tokio::test]
async fn device_name_utterance_pairs_by_substring() {
    let transport = MockTransport::new();
    transport.push_scan_devices(
        Duration::ZERO,
        vec![bt_device("1", "Sony WH-1000XM4"), bt_device("2", "JBL Flip")],
    );

    let (controller, _) = test_controller(transport);
    controller.open_modal();
    controller.select_device_type("bluetooth").unwrap();
    wait_for_screen(controller.store(), Screen::DeviceList).await;

    let action = controller.handle_voice("pair with the jbl flip please");
    assert!(matches!(action, Some(Action::SelectDevice(ref d)) if d.id == "2"));
    wait_for_screen(controller.store(), Screen::Success).await;
}

#[tokio::test]
async fn unmatched_utterance_changes_nothing() {
    let transport = MockTransport::new();
    let (controller, _) = test_controller(Arc::clone(&transport));
    controller.open_modal();

    assert_eq!(controller.handle_voice("what's the weather in tokyo"), None);
    settle().await;

    assert_eq!(controller.store().screen(), Screen::DeviceTypeSelector);
    assert_eq!(transport.scan_call_count(), 0);
}
