//! Action handlers

use std::path::PathBuf;

use nametag_detect::{DetectError, DeviceRecord, RESTORE_NAME, SPOOF_NAME};
use nametag_registry::{export_reg, ExportError, MAX_NAME_LENGTH};

use super::{DeviceStatus, Shell, ShellState};

/// Texts for one kind of rename
struct Rename<'a> {
    name: &'a str,
    status: String,
    done: &'static str,
    failed: &'static str,
}

impl Shell {
    pub(super) fn restore(&mut self, state: ShellState) -> ShellState {
        self.rename(
            state,
            Rename {
                name: RESTORE_NAME,
                status: "Restored to original.".to_string(),
                done: "Registry restored to original name.",
                failed: "Failed to update registry",
            },
        )
    }

    pub(super) fn spoof_default(&mut self, state: ShellState) -> ShellState {
        self.rename(
            state,
            Rename {
                name: SPOOF_NAME,
                status: "Spoofed to default.".to_string(),
                done: "Device spoofed to CH340.",
                failed: "Failed to spoof device",
            },
        )
    }

    pub(super) fn custom_name(&mut self, mut state: ShellState) -> ShellState {
        if self.target_or_warn(&mut state).is_none() {
            return state;
        }

        let name = state.custom_name.trim().to_string();
        if name.is_empty() {
            state.warn("Name is empty.");
            return state;
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            state.warn("Name too long.");
            return state;
        }

        self.rename(
            state,
            Rename {
                name: &name,
                status: format!("Spoofed to: {}", name),
                done: "Device renamed.",
                failed: "Failed to apply custom name",
            },
        )
    }

    pub(super) fn export(&mut self, mut state: ShellState, path: PathBuf) -> ShellState {
        match export_reg(&path, self.target, &state.custom_name) {
            Ok(()) => state.success(format!("Exported to: {}", path.display())),
            Err(ExportError::EmptyName) => state.warn("Enter a name first."),
            Err(e) => state.error(format!("Export failed: {}", e)),
        }
        state
    }

    /// Query devices, update the list and status, and log the result
    pub(super) fn refresh(&mut self, mut state: ShellState) -> ShellState {
        if self.query_devices(&mut state).is_err() {
            return state;
        }
        let text = match &state.device {
            DeviceStatus::Found(record) => format!(
                "Found device on {} ({} serial device(s) attached)",
                record.port,
                state.devices.len()
            ),
            _ => "No compatible device found.".to_string(),
        };
        state.info(text);
        state
    }

    /// Elevation and device preconditions; exactly one warning on failure
    fn target_or_warn(&self, state: &mut ShellState) -> Option<DeviceRecord> {
        if !state.elevated {
            state.warn("Requires Administrator privileges!");
            return None;
        }
        match state.target() {
            Some(record) => Some(record.clone()),
            None => {
                state.warn("Device not found. Please connect supported device.");
                None
            }
        }
    }

    fn rename(&mut self, mut state: ShellState, rename: Rename<'_>) -> ShellState {
        let Some(device) = self.target_or_warn(&mut state) else {
            return state;
        };

        match self
            .services
            .namer
            .set_name(self.target, rename.name, Some(&device.port))
        {
            Ok(outcome) => {
                tracing::debug!(
                    "Wrote {:?} to {} instance(s)",
                    outcome.friendly_name,
                    outcome.instances.len()
                );
                match self.services.namer.current_names(self.target) {
                    Ok(names) => {
                        for (instance, name) in names {
                            tracing::debug!("{}: {:?}", instance, name);
                        }
                    }
                    Err(e) => tracing::warn!("Could not read back {} names: {}", self.target, e),
                }
                if let Err(e) = self.services.rescanner.rescan() {
                    state.warn(format!(
                        "Re-enumeration failed ({}). Replug the device to see the new name.",
                        e
                    ));
                }
                state.success(rename.done);
                // A failed query leaves its own error status in place
                if self.query_devices(&mut state).is_ok() {
                    state.status = rename.status;
                }
            }
            Err(e) => state.error(format!("{}: {}", rename.failed, e)),
        }
        state
    }

    /// Fresh device snapshot into the state, without logging success
    ///
    /// An enumeration failure clears the list, sets an error status and is
    /// logged here before being returned.
    fn query_devices(&self, state: &mut ShellState) -> Result<(), DetectError> {
        let snapshot = match self.services.scanner.scan(self.target) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                state.devices.clear();
                state.device = DeviceStatus::NotFound;
                state.status = "Error: device enumeration failed.".to_string();
                state.error(format!("Device enumeration failed: {}", e));
                return Err(e);
            }
        };

        match snapshot.target {
            Some(record) => {
                state.status = format!("Found: {} ({})", record.description, record.port);
                state.device = DeviceStatus::Found(record);
            }
            None => {
                state.status = "No compatible device found.".to_string();
                state.device = DeviceStatus::NotFound;
            }
        }
        state.devices = snapshot.devices;
        Ok(())
    }
}
