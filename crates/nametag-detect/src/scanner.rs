//! Serial device scanner
//!
//! This module provides serial port enumeration and target lookup.

use serialport::{available_ports, SerialPortType};
use tracing::{debug, info};

use crate::error::DetectError;
use crate::usb_id::UsbId;

/// Description shown when the OS reports none
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Information about a serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., COM3, /dev/ttyACM0)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB serial number (if available)
    pub serial_number: Option<String>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// Device description (on Windows this is the FriendlyName-derived product string)
    pub product: Option<String>,
}

impl SerialPortInfo {
    /// Create from serialport crate's port info
    pub fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number.clone(),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                serial_number: None,
                manufacturer: None,
                product: None,
            },
        }
    }

    /// Description, or "Unknown" when the OS reports none
    pub fn description(&self) -> &str {
        match self.product.as_deref() {
            Some(product) if !product.is_empty() => product,
            _ => UNKNOWN_DESCRIPTION,
        }
    }

    /// Convert into the record the shell displays
    pub fn to_record(&self) -> DeviceRecord {
        DeviceRecord {
            description: self.description().to_string(),
            port: self.port.clone(),
        }
    }
}

/// A device as shown to the user: description plus port name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub description: String,
    pub port: String,
}

impl DeviceRecord {
    /// List row label, e.g. "COM7 - USB-Enhanced-SERIAL CH343"
    pub fn list_label(&self) -> String {
        format!("{} - {}", self.port, self.description)
    }
}

/// Result of [`DeviceScanner::scan`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Every attached device, in OS order
    pub devices: Vec<DeviceRecord>,
    /// First device matching the requested id
    pub target: Option<DeviceRecord>,
}

/// Source of serial device snapshots
///
/// `SystemPorts` asks the OS; tests and the simulator provide their own.
pub trait DeviceSource {
    /// Snapshot of the currently attached serial devices, in OS order
    fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError>;
}

/// Device source backed by the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl DeviceSource for SystemPorts {
    fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        let ports = available_ports()?;
        Ok(ports
            .into_iter()
            .map(|p| SerialPortInfo::from_serialport(p.port_name, &p.port_type))
            .collect())
    }
}

/// Serial device scanner
pub struct DeviceScanner {
    source: Box<dyn DeviceSource>,
}

impl DeviceScanner {
    /// Create a scanner over the OS device list
    pub fn new() -> Self {
        Self::with_source(Box::new(SystemPorts))
    }

    /// Create a scanner over a custom device source
    pub fn with_source(source: Box<dyn DeviceSource>) -> Self {
        Self { source }
    }

    /// Enumerate all attached serial devices (fresh snapshot per call)
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        debug!("Enumerating serial ports...");
        let ports = self.source.ports()?;

        if ports.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", ports.len());
            for port in &ports {
                debug!("  {} - {}", port.port, port.description());
            }
        }

        Ok(ports)
    }

    /// List all attached devices as (port, description) records
    pub fn list_devices(&self) -> Result<Vec<DeviceRecord>, DetectError> {
        Ok(self
            .enumerate_ports()?
            .iter()
            .map(SerialPortInfo::to_record)
            .collect())
    }

    /// One snapshot: every attached device plus the first one matching `id`
    pub fn scan(&self, id: UsbId) -> Result<DeviceSnapshot, DetectError> {
        let ports = self.enumerate_ports()?;
        let target = ports
            .iter()
            .find(|p| id.matches(p.vid, p.pid))
            .map(SerialPortInfo::to_record);

        match &target {
            Some(record) => info!("Found {} on {}", id, record.port),
            None => info!("No device matching {}", id),
        }

        Ok(DeviceSnapshot {
            devices: ports.iter().map(SerialPortInfo::to_record).collect(),
            target,
        })
    }

    /// Find the first attached device matching `id`
    ///
    /// Absence is a normal outcome and yields `Ok(None)`.
    pub fn find_target(&self, id: UsbId) -> Result<Option<DeviceRecord>, DetectError> {
        Ok(self.scan(id)?.target)
    }
}

impl Default for DeviceScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usb_id::{wch, SPOOF_TARGET};
    use serialport::UsbPortInfo;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FixedPorts(Vec<SerialPortInfo>);

    impl DeviceSource for FixedPorts {
        fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
            Ok(self.0.clone())
        }
    }

    struct CountingPorts {
        calls: Rc<Cell<usize>>,
        ports: Vec<SerialPortInfo>,
    }

    impl DeviceSource for CountingPorts {
        fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.ports.clone())
        }
    }

    struct BrokenPorts;

    impl DeviceSource for BrokenPorts {
        fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
            Err(DetectError::EnumerationFailed("no SetupAPI".into()))
        }
    }

    fn usb(port: &str, id: UsbId, product: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port: port.to_string(),
            vid: Some(id.vid),
            pid: Some(id.pid),
            serial_number: None,
            manufacturer: Some("wch.cn".to_string()),
            product: product.map(str::to_string),
        }
    }

    fn native(port: &str) -> SerialPortInfo {
        SerialPortInfo::from_serialport(port.to_string(), &SerialPortType::PciPort)
    }

    #[test]
    fn test_serial_port_info_from_usb() {
        let usb_info = SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x1A86,
            pid: 0x55D3,
            serial_number: Some("5434012345".to_string()),
            manufacturer: Some("wch.cn".to_string()),
            product: Some("USB-Enhanced-SERIAL CH343 (COM7)".to_string()),
        });

        let info = SerialPortInfo::from_serialport("COM7".to_string(), &usb_info);

        assert_eq!(info.vid, Some(0x1A86));
        assert_eq!(info.pid, Some(0x55D3));
        assert_eq!(info.description(), "USB-Enhanced-SERIAL CH343 (COM7)");
    }

    #[test]
    fn test_missing_description_is_unknown() {
        assert_eq!(native("COM1").description(), "Unknown");
        assert_eq!(usb("COM4", wch::CH340, Some("")).description(), "Unknown");
    }

    #[test]
    fn test_list_devices_keeps_os_order() {
        let scanner = DeviceScanner::with_source(Box::new(FixedPorts(vec![
            native("COM1"),
            usb("COM7", SPOOF_TARGET, Some("USB-Enhanced-SERIAL CH343")),
            usb("COM4", wch::CH340, None),
        ])));

        let labels: Vec<_> = scanner
            .list_devices()
            .unwrap()
            .iter()
            .map(DeviceRecord::list_label)
            .collect();

        assert_eq!(
            labels,
            vec![
                "COM1 - Unknown",
                "COM7 - USB-Enhanced-SERIAL CH343",
                "COM4 - Unknown",
            ]
        );
    }

    #[test]
    fn test_find_target_returns_first_match() {
        let scanner = DeviceScanner::with_source(Box::new(FixedPorts(vec![
            usb("COM4", wch::CH340, Some("USB-SERIAL CH340")),
            usb("COM7", SPOOF_TARGET, Some("first")),
            usb("COM9", SPOOF_TARGET, Some("second")),
        ])));

        let found = scanner.find_target(SPOOF_TARGET).unwrap();
        assert_eq!(
            found,
            Some(DeviceRecord {
                description: "first".to_string(),
                port: "COM7".to_string(),
            })
        );
    }

    #[test]
    fn test_find_target_absent_is_none() {
        let scanner = DeviceScanner::with_source(Box::new(FixedPorts(vec![native("COM1")])));
        assert_eq!(scanner.find_target(SPOOF_TARGET).unwrap(), None);
    }

    #[test]
    fn test_scan_uses_one_snapshot() {
        let calls = Rc::new(Cell::new(0));
        let scanner = DeviceScanner::with_source(Box::new(CountingPorts {
            calls: calls.clone(),
            ports: vec![
                native("COM1"),
                usb("COM7", SPOOF_TARGET, Some("USB-Enhanced-SERIAL CH343")),
            ],
        }));

        let snapshot = scanner.scan(SPOOF_TARGET).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(snapshot.devices.len(), 2);
        assert_eq!(snapshot.target.as_ref(), snapshot.devices.get(1));
    }

    #[test]
    fn test_enumeration_failure_propagates() {
        let scanner = DeviceScanner::with_source(Box::new(BrokenPorts));
        assert!(matches!(
            scanner.list_devices(),
            Err(DetectError::EnumerationFailed(_))
        ));
        assert!(scanner.find_target(SPOOF_TARGET).is_err());
    }
}
