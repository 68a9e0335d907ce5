//! Error types for registry, re-enumeration and export operations

use std::path::PathBuf;

use thiserror::Error;

/// Errors building a FriendlyName
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The port suffix alone exceeds the length limit
    #[error("port suffix {suffix:?} does not fit in {max} characters")]
    SuffixTooLong { suffix: String, max: usize },
}

/// Errors reading or writing the device registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Key (or the class key for a VID/PID) does not exist
    #[error("registry key not found: {0}")]
    KeyNotFound(String),

    /// Process lacks rights on the key
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Any other Win32 status
    #[error("registry error {code} on {path}")]
    Os { path: String, code: u32 },

    /// Writing one instance failed; earlier instances were rolled back
    #[error("failed to rename instance {instance}: {source}")]
    WriteFailed {
        instance: String,
        source: Box<RegistryError>,
    },

    /// Rollback after a failed write left some instances modified
    #[error("{cause}; rollback incomplete for {}", .instances.join(", "))]
    RollbackFailed {
        instances: Vec<String>,
        cause: Box<RegistryError>,
    },

    /// Requested name cannot be composed
    #[error("invalid name: {0}")]
    Name(#[from] NameError),

    /// No registry on this platform
    #[error("registry access is not supported on this platform")]
    Unsupported,
}

/// Errors asking the configuration manager to re-scan devices
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RescanError {
    /// CM_Locate_DevNodeW did not return CR_SUCCESS
    #[error("failed to locate root device node (CONFIGRET {0:#x})")]
    LocateFailed(u32),

    /// CM_Reenumerate_DevNode did not return CR_SUCCESS
    #[error("device re-enumeration failed (CONFIGRET {0:#x})")]
    ReenumerateFailed(u32),

    /// No configuration manager on this platform
    #[error("device re-enumeration is not supported on this platform")]
    Unsupported,
}

/// Errors exporting a .reg file
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export
    #[error("name is empty")]
    EmptyName,

    /// Writing the file failed
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
