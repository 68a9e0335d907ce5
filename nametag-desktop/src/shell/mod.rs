//! Window-independent application logic
//!
//! The egui front end only draws a [`ShellState`] and turns clicks into
//! [`Action`]s. Everything else lives here:
//! - `state`: the explicit state value
//! - `actions`: one handler per action
//!
//! `Shell::dispatch` takes the current state and returns the next one, so
//! the handlers can be driven from tests against a simulated host.

mod actions;
mod state;

use std::path::{Path, PathBuf};
use std::time::Duration;

use nametag_detect::{DeviceScanner, UsbId, SPOOF_TARGET};
use nametag_registry::{
    FixedPrivileges, PrivilegeCheck, ProcessPrivileges, ReEnumerator, RegistryNamer,
};
use nametag_sim::SimulatedHost;

pub use state::{DeviceStatus, LogLevel, LogLine, ShellState};

/// User actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write the driver's own name back
    Restore,
    /// Rename to the CH340 name
    SpoofDefault,
    /// Rename to the contents of the name field
    CustomName,
    /// Export the name field to the configured .reg path
    ExportReg,
    /// Export the name field to a path the user picked
    ExportRegTo(PathBuf),
    /// Query devices again
    Refresh,
}

/// OS-facing services the shell drives
pub struct Services {
    pub scanner: DeviceScanner,
    pub namer: RegistryNamer,
    pub rescanner: ReEnumerator,
    pub privileges: Box<dyn PrivilegeCheck>,
}

impl Services {
    /// Services backed by the OS, waiting `settle` after each re-enumeration
    pub fn system(settle: Duration) -> Self {
        Self {
            scanner: DeviceScanner::new(),
            namer: RegistryNamer::system(),
            rescanner: ReEnumerator::system(settle),
            privileges: Box::new(ProcessPrivileges),
        }
    }

    /// Services backed by a simulated host; the privilege check always passes
    pub fn simulated(host: &SimulatedHost) -> Self {
        Self {
            scanner: host.scanner(),
            namer: host.namer(),
            rescanner: host.rescanner(),
            privileges: Box::new(FixedPrivileges(true)),
        }
    }
}

/// Action dispatcher
pub struct Shell {
    services: Services,
    target: UsbId,
    export_path: PathBuf,
}

impl Shell {
    pub fn new(services: Services, export_path: PathBuf) -> Self {
        Self {
            services,
            target: SPOOF_TARGET,
            export_path,
        }
    }

    /// Path used by [`Action::ExportReg`]
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Initial state: privileges checked once, devices queried once
    pub fn start(&mut self) -> ShellState {
        let mut state = ShellState {
            elevated: self.services.privileges.is_elevated(),
            ..ShellState::default()
        };
        if !state.elevated {
            state.warn("Not running as Administrator. Renaming is disabled.");
        }
        self.refresh(state)
    }

    /// Run one action and return the resulting state
    pub fn dispatch(&mut self, state: ShellState, action: Action) -> ShellState {
        tracing::debug!("Dispatching {:?}", action);
        match action {
            Action::Restore => self.restore(state),
            Action::SpoofDefault => self.spoof_default(state),
            Action::CustomName => self.custom_name(state),
            Action::ExportReg => {
                let path = self.export_path.clone();
                self.export(state, path)
            }
            Action::ExportRegTo(path) => self.export(state, path),
            Action::Refresh => self.refresh(state),
        }
    }
}
