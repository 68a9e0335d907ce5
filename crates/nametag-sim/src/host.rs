//! Simulated Windows host
//!
//! One shared state backs three views: the serial enumerator
//! ([`DeviceSource`]), the registry ([`RegistryBackend`]) and the device
//! tree ([`DeviceTree`]). Like the real OS, registry writes do not change
//! what the enumerator reports until the tree is re-enumerated.

use std::cell::RefCell;
use std::rc::Rc;

use nametag_detect::{DetectError, DeviceScanner, DeviceSource, SerialPortInfo, UsbId};
use nametag_registry::{
    class_key_path, DevNode, DeviceTree, MemoryRegistry, NoSettle, ReEnumerator, RegistryBackend,
    RegistryError, RegistryNamer, RescanError, FRIENDLY_NAME_VALUE,
};
use tracing::{debug, info};

use crate::device::{SimulatedDevice, SimulatedDeviceConfig};

/// CR_FAILURE
const CR_FAILURE: u32 = 0x13;

#[derive(Debug, Default)]
struct HostState {
    devices: Vec<SimulatedDevice>,
    registry: MemoryRegistry,
    enumeration_fails: bool,
    rescan_fails: bool,
    rescans: usize,
}

/// Shared handle to a simulated host; clones see the same state
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    state: Rc<RefCell<HostState>>,
}

fn instance_path(id: UsbId, instance: &str) -> String {
    format!(r"{}\{}", class_key_path(id), instance)
}

impl SimulatedHost {
    /// Host with no devices and an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with a single out-of-the-box CH343 attached on `port`
    pub fn with_ch343(port: &str) -> Self {
        let host = Self::new();
        host.plug(SimulatedDeviceConfig {
            port: port.to_string(),
            id: nametag_detect::SPOOF_TARGET,
            instance: "5434012345".to_string(),
            friendly_name: format!("{} ({})", nametag_detect::RESTORE_NAME, port),
        });
        host
    }

    /// Attach a device and register its instance key
    pub fn plug(&self, config: SimulatedDeviceConfig) {
        let mut state = self.state.borrow_mut();
        state.registry.insert_value(
            &instance_path(config.id, &config.instance),
            FRIENDLY_NAME_VALUE,
            &config.friendly_name,
        );
        state.devices.push(SimulatedDevice::from_config(&config));
        info!("Plugged {} on {}", config.id, config.port);
    }

    /// Detach the device on `port`; its registry instance stays behind
    pub fn unplug(&self, port: &str) {
        self.state.borrow_mut().devices.retain(|d| d.port != port);
        info!("Unplugged {}", port);
    }

    /// Register an instance that is not currently attached
    pub fn add_stale_instance(&self, id: UsbId, instance: &str, friendly_name: &str) {
        self.state.borrow_mut().registry.insert_value(
            &instance_path(id, instance),
            FRIENDLY_NAME_VALUE,
            friendly_name,
        );
    }

    /// Make writes to one instance key fail with access denied
    pub fn deny_instance_writes(&self, id: UsbId, instance: &str) {
        self.state
            .borrow_mut()
            .registry
            .deny_writes(&instance_path(id, instance));
    }

    /// Make the serial enumerator fail
    pub fn set_enumeration_fails(&self, fails: bool) {
        self.state.borrow_mut().enumeration_fails = fails;
    }

    /// Make CM_Reenumerate_DevNode fail
    pub fn set_rescan_fails(&self, fails: bool) {
        self.state.borrow_mut().rescan_fails = fails;
    }

    /// FriendlyName stored for an instance
    pub fn friendly_name(&self, id: UsbId, instance: &str) -> Option<String> {
        self.state
            .borrow()
            .registry
            .value(&instance_path(id, instance), FRIENDLY_NAME_VALUE)
            .map(str::to_string)
    }

    /// Registry writes and deletes so far
    pub fn registry_writes(&self) -> usize {
        self.state.borrow().registry.write_count()
    }

    /// Successful re-enumerations so far
    pub fn rescans(&self) -> usize {
        self.state.borrow().rescans
    }

    /// Scanner over this host's serial devices
    pub fn scanner(&self) -> DeviceScanner {
        DeviceScanner::with_source(Box::new(self.clone()))
    }

    /// Namer over this host's registry
    pub fn namer(&self) -> RegistryNamer {
        RegistryNamer::new(Box::new(self.clone()))
    }

    /// Re-enumerator over this host's device tree, with no settle delay
    pub fn rescanner(&self) -> ReEnumerator {
        ReEnumerator::new(Box::new(self.clone()), Box::new(NoSettle))
    }
}

impl DeviceSource for SimulatedHost {
    fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        let state = self.state.borrow();
        if state.enumeration_fails {
            return Err(DetectError::EnumerationFailed(
                "simulated enumeration failure".into(),
            ));
        }
        Ok(state.devices.iter().map(SimulatedDevice::port_info).collect())
    }
}

impl RegistryBackend for SimulatedHost {
    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        self.state.borrow().registry.subkeys(path)
    }

    fn read_string(&self, path: &str, value: &str) -> Result<Option<String>, RegistryError> {
        self.state.borrow().registry.read_string(path, value)
    }

    fn write_string(&mut self, path: &str, value: &str, data: &str) -> Result<(), RegistryError> {
        self.state
            .borrow_mut()
            .registry
            .write_string(path, value, data)
    }

    fn delete_value(&mut self, path: &str, value: &str) -> Result<(), RegistryError> {
        self.state.borrow_mut().registry.delete_value(path, value)
    }
}

impl DeviceTree for SimulatedHost {
    fn locate_root(&self) -> Result<DevNode, RescanError> {
        Ok(1)
    }

    fn reenumerate(&self, _node: DevNode) -> Result<(), RescanError> {
        let mut state = self.state.borrow_mut();
        if state.rescan_fails {
            return Err(RescanError::ReenumerateFailed(CR_FAILURE));
        }

        let HostState {
            devices, registry, ..
        } = &mut *state;
        for device in devices.iter_mut() {
            let path = instance_path(device.id, &device.instance);
            if let Some(name) = registry.value(&path, FRIENDLY_NAME_VALUE) {
                if device.description != name {
                    debug!("{}: {:?} -> {:?}", device.port, device.description, name);
                    device.description = name.to_string();
                }
            }
        }
        state.rescans += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nametag_detect::{SPOOF_NAME, SPOOF_TARGET};

    #[test]
    fn test_ch343_host_reports_driver_name() {
        let host = SimulatedHost::with_ch343("COM7");
        let found = host.scanner().find_target(SPOOF_TARGET).unwrap().unwrap();

        assert_eq!(found.port, "COM7");
        assert_eq!(found.description, "USB-Enhanced-SERIAL CH343 (COM7)");
    }

    #[test]
    fn test_registry_write_is_invisible_until_rescan() {
        let host = SimulatedHost::with_ch343("COM7");
        let mut namer = host.namer();
        let scanner = host.scanner();

        namer.set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7")).unwrap();
        let before = scanner.find_target(SPOOF_TARGET).unwrap().unwrap();
        assert_eq!(before.description, "USB-Enhanced-SERIAL CH343 (COM7)");

        host.rescanner().rescan().unwrap();
        let after = scanner.find_target(SPOOF_TARGET).unwrap().unwrap();
        assert_eq!(after.description, "USB-SERIAL CH340 (COM7)");
        assert_eq!(host.rescans(), 1);
    }

    #[test]
    fn test_unplug_keeps_registry_instance() {
        let host = SimulatedHost::with_ch343("COM7");
        host.unplug("COM7");

        assert!(host.scanner().list_devices().unwrap().is_empty());
        assert!(host.friendly_name(SPOOF_TARGET, "5434012345").is_some());
    }

    #[test]
    fn test_failure_switches() {
        let host = SimulatedHost::with_ch343("COM7");
        host.set_enumeration_fails(true);
        host.set_rescan_fails(true);

        assert!(host.scanner().list_devices().is_err());
        assert_eq!(
            host.rescanner().rescan(),
            Err(RescanError::ReenumerateFailed(CR_FAILURE))
        );
        assert_eq!(host.rescans(), 0);
    }
}
