//! USB Vendor/Product IDs for the adapters nametag manages
//!
//! The spoof target is the WCH CH343 (USB-Enhanced-SERIAL). The other WCH
//! product IDs are only used to label rows in the device list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// USB Vendor ID / Product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl UsbId {
    pub const fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid }
    }

    /// Check a VID/PID reported by the enumerator against this ID
    pub fn matches(&self, vid: Option<u16>, pid: Option<u16>) -> bool {
        vid == Some(self.vid) && pid == Some(self.pid)
    }
}

impl fmt::Display for UsbId {
    /// Formats as `VID_1A86&PID_55D3`, the form used in registry enum paths
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VID_{:04X}&PID_{:04X}", self.vid, self.pid)
    }
}

/// WCH (Nanjing Qinheng) USB-serial bridges
pub mod wch {
    use super::UsbId;

    pub const VID: u16 = 0x1A86;

    pub const CH340: UsbId = UsbId::new(VID, 0x7523);
    pub const CH341: UsbId = UsbId::new(VID, 0x5523);
    pub const CH343: UsbId = UsbId::new(VID, 0x55D3);
    pub const CH9102: UsbId = UsbId::new(VID, 0x55D4);
}

/// The device class whose FriendlyName this tool rewrites
pub const SPOOF_TARGET: UsbId = wch::CH343;

/// Name the CH343 driver reports out of the box
pub const RESTORE_NAME: &str = "USB-Enhanced-SERIAL CH343";

/// Name reported by the older CH340 driver
pub const SPOOF_NAME: &str = "USB-SERIAL CH340";

/// Get a chip label for a known VID/PID
pub fn chip_name(vid: Option<u16>, pid: Option<u16>) -> Option<&'static str> {
    let id = UsbId::new(vid?, pid?);
    match id {
        wch::CH340 => Some("CH340"),
        wch::CH341 => Some("CH341"),
        wch::CH343 => Some("CH343"),
        wch::CH9102 => Some("CH9102"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_uppercase_zero_padded() {
        assert_eq!(SPOOF_TARGET.to_string(), "VID_1A86&PID_55D3");
        assert_eq!(UsbId::new(0x3, 0xab).to_string(), "VID_0003&PID_00AB");
    }

    #[test]
    fn test_matches_requires_both_ids() {
        assert!(SPOOF_TARGET.matches(Some(0x1A86), Some(0x55D3)));
        assert!(!SPOOF_TARGET.matches(Some(0x1A86), Some(0x7523)));
        assert!(!SPOOF_TARGET.matches(Some(0x1A86), None));
        assert!(!SPOOF_TARGET.matches(None, None));
    }

    #[test]
    fn test_chip_name() {
        assert_eq!(chip_name(Some(0x1A86), Some(0x55D3)), Some("CH343"));
        assert_eq!(chip_name(Some(0x1A86), Some(0x7523)), Some("CH340"));
        assert_eq!(chip_name(Some(0x0403), Some(0x6001)), None);
        assert_eq!(chip_name(None, Some(0x55D3)), None);
    }
}
