//! Simulated Host Library
//!
//! This crate stands in for a Windows machine with USB serial adapters
//! attached, so the nametag stack can be driven without hardware or
//! administrator rights. It includes:
//!
//! - **SimulatedHost**: serial enumerator, registry and device tree sharing
//!   one state
//! - **SimulatedDevice**: an attached adapter whose description refreshes
//!   from its registry FriendlyName on re-enumeration
//!
//! # Example
//!
//! ```rust
//! use nametag_detect::{SPOOF_NAME, SPOOF_TARGET};
//! use nametag_sim::SimulatedHost;
//!
//! let host = SimulatedHost::with_ch343("COM7");
//!
//! host.namer().set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7")).unwrap();
//! host.rescanner().rescan().unwrap();
//!
//! let device = host.scanner().find_target(SPOOF_TARGET).unwrap().unwrap();
//! assert_eq!(device.description, "USB-SERIAL CH340 (COM7)");
//! ```

pub mod device;
pub mod host;

pub use device::{SimulatedDevice, SimulatedDeviceConfig};
pub use host::SimulatedHost;
