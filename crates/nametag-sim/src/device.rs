//! Simulated USB serial device

use nametag_detect::{SerialPortInfo, UsbId};
use serde::Deserialize;

/// Configuration for plugging in a simulated device
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulatedDeviceConfig {
    /// Port name, e.g. "COM7"
    pub port: String,
    /// USB identifiers
    pub id: UsbId,
    /// Instance subkey under the class key (usually the serial number)
    pub instance: String,
    /// FriendlyName the driver assigned at install time
    pub friendly_name: String,
}

/// A device currently attached to the simulated host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedDevice {
    pub port: String,
    pub id: UsbId,
    pub instance: String,
    /// Description the enumerator reports; refreshed only on re-enumeration
    pub description: String,
}

impl SimulatedDevice {
    pub fn from_config(config: &SimulatedDeviceConfig) -> Self {
        Self {
            port: config.port.clone(),
            id: config.id,
            instance: config.instance.clone(),
            description: config.friendly_name.clone(),
        }
    }

    /// Row as the serial enumerator would report it
    pub fn port_info(&self) -> SerialPortInfo {
        SerialPortInfo {
            port: self.port.clone(),
            vid: Some(self.id.vid),
            pid: Some(self.id.pid),
            serial_number: Some(self.instance.clone()),
            manufacturer: Some("wch.cn".to_string()),
            product: Some(self.description.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let config: SimulatedDeviceConfig = serde_json::from_str(
            r#"{
                "port": "COM9",
                "id": { "vid": 6790, "pid": 21971 },
                "instance": "5434099999",
                "friendly_name": "USB-Enhanced-SERIAL CH343 (COM9)"
            }"#,
        )
        .unwrap();

        let device = SimulatedDevice::from_config(&config);
        let info = device.port_info();
        assert_eq!(info.port, "COM9");
        assert_eq!(info.vid, Some(0x1A86));
        assert_eq!(info.pid, Some(0x55D3));
        assert_eq!(device.description, "USB-Enhanced-SERIAL CH343 (COM9)");
    }
}
