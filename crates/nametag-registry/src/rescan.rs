//! Device tree re-enumeration
//!
//! After a FriendlyName changes, the configuration manager is asked to
//! re-scan the whole tree from the root so that port lists pick up the new
//! name without a replug. The scan is followed by a fixed settle period.

use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::RescanError;

/// How long to wait after a re-scan before querying devices again
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

/// Configuration manager device instance handle
pub type DevNode = u32;

/// Device tree that can be re-enumerated
pub trait DeviceTree {
    /// Handle of the root device node
    fn locate_root(&self) -> Result<DevNode, RescanError>;

    /// Re-enumerate `node` and everything below it
    fn reenumerate(&self, node: DevNode) -> Result<(), RescanError>;
}

/// Wait applied after a successful re-scan
pub trait Settle {
    fn settle(&self);
}

/// Blocks the calling thread for a fixed duration
#[derive(Debug, Clone, Copy)]
pub struct SleepSettle(pub Duration);

impl Default for SleepSettle {
    fn default() -> Self {
        Self(DEFAULT_SETTLE)
    }
}

impl Settle for SleepSettle {
    fn settle(&self) {
        thread::sleep(self.0);
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettle;

impl Settle for NoSettle {
    fn settle(&self) {}
}

/// Device tree for platforms without a configuration manager
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedDeviceTree;

impl DeviceTree for UnsupportedDeviceTree {
    fn locate_root(&self) -> Result<DevNode, RescanError> {
        Err(RescanError::Unsupported)
    }

    fn reenumerate(&self, _node: DevNode) -> Result<(), RescanError> {
        Err(RescanError::Unsupported)
    }
}

/// Triggers a recursive device re-scan and waits for it to settle
pub struct ReEnumerator {
    tree: Box<dyn DeviceTree>,
    settle: Box<dyn Settle>,
}

impl ReEnumerator {
    pub fn new(tree: Box<dyn DeviceTree>, settle: Box<dyn Settle>) -> Self {
        Self { tree, settle }
    }

    /// Re-enumerator over this platform's device tree
    pub fn system(settle_for: Duration) -> Self {
        #[cfg(windows)]
        let tree: Box<dyn DeviceTree> = Box::new(crate::windows::CfgMgrDeviceTree);
        #[cfg(not(windows))]
        let tree: Box<dyn DeviceTree> = Box::new(UnsupportedDeviceTree);

        Self::new(tree, Box::new(SleepSettle(settle_for)))
    }

    /// Re-scan from the root node, then settle. No retry on failure.
    pub fn rescan(&self) -> Result<(), RescanError> {
        let root = self.tree.locate_root()?;
        debug!("Re-enumerating from root devnode {}", root);
        self.tree.reenumerate(root)?;

        debug!("Waiting for devices to settle");
        self.settle.settle();

        info!("Device tree re-enumerated");
        Ok(())
    }
}
