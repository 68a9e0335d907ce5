//! FriendlyName rewriting under the USB enumeration key
//!
//! Every VID/PID has a class key under `HKLM\SYSTEM\CurrentControlSet\Enum\USB`.
//! Each child of that key is one device instance that has been plugged in at
//! some point (one per serial number or port location). Renaming writes the
//! `FriendlyName` value of every instance.
//!
//! The rename is all-or-nothing: the instance list is materialized up
//! front, each instance's previous value is snapshotted before it is
//! overwritten, and a failed write restores the instances already written.

use nametag_detect::UsbId;
use tracing::{debug, info, warn};

use crate::backend::RegistryBackend;
use crate::error::RegistryError;
use crate::name::NameCandidate;

/// Registry value Windows displays for a device instance
pub const FRIENDLY_NAME_VALUE: &str = "FriendlyName";

/// HKLM-relative root of the USB enumeration tree
pub const USB_ENUM_ROOT: &str = r"SYSTEM\CurrentControlSet\Enum\USB";

/// HKLM-relative class key for a VID/PID, e.g. `...\USB\VID_1A86&PID_55D3`
pub fn class_key_path(id: UsbId) -> String {
    format!(r"{}\{}", USB_ENUM_ROOT, id)
}

/// Result of a successful rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Value written to every instance
    pub friendly_name: String,
    /// Instance subkeys that were updated
    pub instances: Vec<String>,
}

/// Previous state of one instance, kept for rollback
struct Snapshot {
    instance: String,
    path: String,
    previous: Option<String>,
}

/// Writes FriendlyName values through a registry backend
pub struct RegistryNamer {
    backend: Box<dyn RegistryBackend>,
}

impl RegistryNamer {
    pub fn new(backend: Box<dyn RegistryBackend>) -> Self {
        Self { backend }
    }

    /// Namer over this platform's registry
    pub fn system() -> Self {
        #[cfg(windows)]
        let backend: Box<dyn RegistryBackend> = Box::new(crate::windows::WindowsRegistry);
        #[cfg(not(windows))]
        let backend: Box<dyn RegistryBackend> = Box::new(crate::backend::UnsupportedRegistry);

        Self::new(backend)
    }

    /// Set the FriendlyName of every instance of `id`
    ///
    /// With `port_suffix`, the value becomes `"<name> (<port>)"`, the name
    /// truncated so the whole value fits in 40 characters. The caller must
    /// already hold administrative rights.
    pub fn set_name(
        &mut self,
        id: UsbId,
        name: &str,
        port_suffix: Option<&str>,
    ) -> Result<RenameOutcome, RegistryError> {
        let mut candidate = NameCandidate::new(name);
        if let Some(port) = port_suffix {
            candidate = candidate.with_port(port);
        }
        let friendly_name = candidate.compose()?;

        let class_path = class_key_path(id);
        let instances = self.backend.subkeys(&class_path)?;
        if instances.is_empty() {
            warn!("{} has no device instances; nothing renamed", class_path);
        }

        let mut written: Vec<Snapshot> = Vec::with_capacity(instances.len());
        for instance in &instances {
            let path = format!(r"{}\{}", class_path, instance);
            match self.write_instance(&path, &friendly_name) {
                Ok(previous) => {
                    debug!("{}: {:?} -> {:?}", instance, previous, friendly_name);
                    written.push(Snapshot {
                        instance: instance.clone(),
                        path,
                        previous,
                    });
                }
                Err(e) => {
                    warn!(
                        "Renaming {} failed ({}); rolling back {} instance(s)",
                        instance,
                        e,
                        written.len()
                    );
                    let cause = RegistryError::WriteFailed {
                        instance: instance.clone(),
                        source: Box::new(e),
                    };
                    return Err(self.roll_back(written, cause));
                }
            }
        }

        info!(
            "Set {} on {} instance(s) of {} to {:?}",
            FRIENDLY_NAME_VALUE,
            instances.len(),
            id,
            friendly_name
        );

        Ok(RenameOutcome {
            friendly_name,
            instances,
        })
    }

    /// Current FriendlyName of every instance of `id`
    pub fn current_names(&self, id: UsbId) -> Result<Vec<(String, Option<String>)>, RegistryError> {
        let class_path = class_key_path(id);
        self.backend
            .subkeys(&class_path)?
            .into_iter()
            .map(|instance| {
                let path = format!(r"{}\{}", class_path, instance);
                let name = self.backend.read_string(&path, FRIENDLY_NAME_VALUE)?;
                Ok((instance, name))
            })
            .collect()
    }

    /// Snapshot then overwrite one instance; returns the previous value
    fn write_instance(&mut self, path: &str, name: &str) -> Result<Option<String>, RegistryError> {
        let previous = self.backend.read_string(path, FRIENDLY_NAME_VALUE)?;
        self.backend.write_string(path, FRIENDLY_NAME_VALUE, name)?;
        Ok(previous)
    }

    /// Restore snapshots newest first; returns the error to report
    fn roll_back(&mut self, written: Vec<Snapshot>, cause: RegistryError) -> RegistryError {
        let mut stuck = Vec::new();

        for snapshot in written.into_iter().rev() {
            let restored = match &snapshot.previous {
                Some(previous) => {
                    self.backend
                        .write_string(&snapshot.path, FRIENDLY_NAME_VALUE, previous)
                }
                None => self.backend.delete_value(&snapshot.path, FRIENDLY_NAME_VALUE),
            };

            match restored {
                Ok(()) => debug!("Restored {}", snapshot.instance),
                Err(e) => {
                    warn!("Could not restore {}: {}", snapshot.instance, e);
                    stuck.push(snapshot.instance);
                }
            }
        }

        if stuck.is_empty() {
            cause
        } else {
            RegistryError::RollbackFailed {
                instances: stuck,
                cause: Box::new(cause),
            }
        }
    }
}
