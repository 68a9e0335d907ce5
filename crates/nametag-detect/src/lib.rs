//! Serial Device Detection Library
//!
//! This crate enumerates attached serial devices and locates the USB
//! adapter whose FriendlyName nametag manages.
//!
//! # Example
//!
//! ```rust,no_run
//! use nametag_detect::{DeviceScanner, SPOOF_TARGET};
//!
//! let scanner = DeviceScanner::new();
//!
//! for device in scanner.list_devices().unwrap() {
//!     println!("{}", device.list_label());
//! }
//!
//! if let Some(target) = scanner.find_target(SPOOF_TARGET).unwrap() {
//!     println!("Target on {}", target.port);
//! }
//! ```

pub mod error;
pub mod scanner;
pub mod usb_id;

pub use error::DetectError;
pub use scanner::{
    DeviceRecord, DeviceScanner, DeviceSnapshot, DeviceSource, SerialPortInfo, SystemPorts,
};
pub use usb_id::{chip_name, UsbId, RESTORE_NAME, SPOOF_NAME, SPOOF_TARGET};
