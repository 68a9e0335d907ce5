//! USB FriendlyName Registry Library
//!
//! This crate rewrites the `FriendlyName` that Windows shows for a USB
//! serial adapter, asks the configuration manager to re-enumerate so the
//! new name appears without a replug, and exports the change as a `.reg`
//! file.
//!
//! # Architecture
//!
//! OS access sits behind small traits so that everything above them can be
//! exercised without Windows:
//!
//! - [`RegistryBackend`]: `WindowsRegistry` (windows-sys), [`MemoryRegistry`]
//!   for tests, [`UnsupportedRegistry`] elsewhere
//! - [`DeviceTree`] and [`Settle`]: cfgmgr32 re-enumeration and the wait after it
//! - [`PrivilegeCheck`]: the administrator test
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use nametag_detect::{SPOOF_NAME, SPOOF_TARGET};
//! use nametag_registry::{ReEnumerator, RegistryNamer};
//!
//! let mut namer = RegistryNamer::system();
//! namer.set_name(SPOOF_TARGET, SPOOF_NAME, Some("COM7")).unwrap();
//!
//! ReEnumerator::system(Duration::from_secs(2)).rescan().unwrap();
//! ```

pub mod backend;
pub mod elevation;
pub mod error;
pub mod export;
pub mod name;
pub mod namer;
pub mod rescan;
#[cfg(windows)]
pub mod windows;

pub use backend::{MemoryRegistry, RegistryBackend, UnsupportedRegistry};
pub use elevation::{FixedPrivileges, PrivilegeCheck, ProcessPrivileges};
pub use error::{ExportError, NameError, RegistryError, RescanError};
pub use export::{export_reg, render_reg, DEFAULT_EXPORT_FILE};
pub use name::{NameCandidate, MAX_NAME_LENGTH};
pub use namer::{class_key_path, RegistryNamer, RenameOutcome, FRIENDLY_NAME_VALUE};
pub use rescan::{
    DevNode, DeviceTree, NoSettle, ReEnumerator, Settle, SleepSettle, UnsupportedDeviceTree,
    DEFAULT_SETTLE,
};
#[cfg(windows)]
pub use windows::{CfgMgrDeviceTree, WindowsRegistry};
