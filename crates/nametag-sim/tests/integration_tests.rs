//! Integration tests for the nametag stack on a simulated host
//!
//! These tests drive the scanner, namer and re-enumerator together:
//! - Renames reach every registered instance, attached or not
//! - Device descriptions change only after re-enumeration
//! - Failed renames leave the registry and device list untouched

use nametag_detect::{UsbId, RESTORE_NAME, SPOOF_NAME, SPOOF_TARGET};
use nametag_registry::{RegistryError, MAX_NAME_LENGTH};
use nametag_sim::{SimulatedDeviceConfig, SimulatedHost};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// CH343 on COM7 plus an older instance from a different USB port
    pub fn host_with_history() -> SimulatedHost {
        let host = SimulatedHost::with_ch343("COM7");
        host.add_stale_instance(SPOOF_TARGET, "6&2F1B0A3&0&1", "USB-Enhanced-SERIAL CH343 (COM3)");
        host
    }

    /// Description currently reported for the target device
    pub fn target_description(host: &SimulatedHost) -> String {
        host.scanner()
            .find_target(SPOOF_TARGET)
            .unwrap()
            .expect("target attached")
            .description
    }
}

// ============================================================================
// Rename + Re-enumeration
// ============================================================================

#[test]
fn spoof_then_refresh_shows_new_name() {
    let host = helpers::host_with_history();
    let mut namer = host.namer();

    namer.set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7")).unwrap();
    host.rescanner().rescan().unwrap();

    assert_eq!(helpers::target_description(&host), "USB-SERIAL CH340 (COM7)");
}

#[test]
fn restore_after_spoof_round_trips() {
    let host = helpers::host_with_history();
    let mut namer = host.namer();
    let rescanner = host.rescanner();

    namer.set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7")).unwrap();
    rescanner.rescan().unwrap();
    namer.set_name(SPOOF_TARGET, RESTORE_NAME, Some("COM7")).unwrap();
    rescanner.rescan().unwrap();

    assert_eq!(
        helpers::target_description(&host),
        "USB-Enhanced-SERIAL CH343 (COM7)"
    );
    assert_eq!(host.rescans(), 2);
}

#[test]
fn rename_reaches_detached_instances() {
    let host = helpers::host_with_history();

    let outcome = host
        .namer()
        .set_name(SPOOF_TARGET, "Bench adapter", Some("COM7"))
        .unwrap();

    assert_eq!(outcome.instances.len(), 2);
    assert_eq!(
        host.friendly_name(SPOOF_TARGET, "6&2F1B0A3&0&1").as_deref(),
        Some("Bench adapter (COM7)")
    );
}

#[test]
fn other_devices_are_untouched() {
    let host = helpers::host_with_history();
    let ch340 = UsbId::new(0x1A86, 0x7523);
    host.plug(SimulatedDeviceConfig {
        port: "COM4".into(),
        id: ch340,
        instance: "7&11AA22BB&0&3".into(),
        friendly_name: "USB-SERIAL CH340 (COM4)".into(),
    });

    host.namer()
        .set_name(SPOOF_TARGET, "Spoofed", Some("COM7"))
        .unwrap();
    host.rescanner().rescan().unwrap();

    let devices = host.scanner().list_devices().unwrap();
    let labels: Vec<_> = devices.iter().map(|d| d.list_label()).collect();
    assert_eq!(
        labels,
        vec!["COM7 - Spoofed (COM7)", "COM4 - USB-SERIAL CH340 (COM4)"]
    );
}

// ============================================================================
// Failure Handling
// ============================================================================

#[test]
fn denied_instance_rolls_back_everything() {
    let host = helpers::host_with_history();
    host.deny_instance_writes(SPOOF_TARGET, "6&2F1B0A3&0&1");

    let err = host
        .namer()
        .set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7"))
        .unwrap_err();
    host.rescanner().rescan().unwrap();

    assert!(matches!(err, RegistryError::WriteFailed { .. }));
    assert_eq!(
        host.friendly_name(SPOOF_TARGET, "5434012345").as_deref(),
        Some("USB-Enhanced-SERIAL CH343 (COM7)")
    );
    assert_eq!(
        helpers::target_description(&host),
        "USB-Enhanced-SERIAL CH343 (COM7)"
    );
}

#[test]
fn unknown_vid_pid_fails_without_writes() {
    let host = helpers::host_with_history();

    let result = host
        .namer()
        .set_name(UsbId::new(0x0403, 0x6001), SPOOF_NAME, None);

    assert!(matches!(result, Err(RegistryError::KeyNotFound(_))));
    assert_eq!(host.registry_writes(), 0);
}

#[test]
fn failed_rescan_leaves_stale_description() {
    let host = helpers::host_with_history();
    host.set_rescan_fails(true);

    host.namer()
        .set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7"))
        .unwrap();

    assert!(host.rescanner().rescan().is_err());
    assert_eq!(
        helpers::target_description(&host),
        "USB-Enhanced-SERIAL CH343 (COM7)"
    );
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn refreshed_description_is_bounded_and_keeps_port(
            name in "[ -~]{1,60}",
            port in 1u16..300,
        ) {
            let port = format!("COM{}", port);
            let host = SimulatedHost::with_ch343(&port);

            host.namer().set_name(SPOOF_TARGET, &name, Some(&port)).unwrap();
            host.rescanner().rescan().unwrap();

            let description = helpers::target_description(&host);
            let suffix = format!(" ({})", port);
            prop_assert!(description.chars().count() <= MAX_NAME_LENGTH);
            prop_assert!(description.ends_with(&suffix));
        }
    }
}
