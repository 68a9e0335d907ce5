//! `.reg` file export
//!
//! Produces a regedit import file that sets the FriendlyName on the class
//! key, for applying the change on another machine or later. Exporting never
//! touches the live registry.

use std::path::Path;

use nametag_detect::UsbId;
use tracing::info;

use crate::error::ExportError;
use crate::namer::{class_key_path, FRIENDLY_NAME_VALUE};

/// First line of every version 5 .reg file
pub const REG_HEADER: &str = "Windows Registry Editor Version 5.00";

/// Default export file, relative to the working directory
pub const DEFAULT_EXPORT_FILE: &str = "spoof_patch.reg";

/// Escape a string for a quoted .reg value
fn escape(value: &str) -> String {
    value.replace('\\', r"\\").replace('"', "\\\"")
}

/// Render the .reg text for setting `name` on the class key of `id`
pub fn render_reg(id: UsbId, name: &str) -> String {
    format!(
        "{}\r\n\r\n[HKEY_LOCAL_MACHINE\\{}]\r\n\"{}\"=\"{}\"\r\n",
        REG_HEADER,
        class_key_path(id),
        FRIENDLY_NAME_VALUE,
        escape(name)
    )
}

/// Write the .reg file, replacing any existing file at `path`
///
/// The name is trimmed; an empty name writes nothing.
pub fn export_reg(path: &Path, id: UsbId, name: &str) -> Result<(), ExportError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ExportError::EmptyName);
    }

    std::fs::write(path, render_reg(id, name)).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Exported {} for {} to {}", FRIENDLY_NAME_VALUE, id, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nametag_detect::SPOOF_TARGET;

    const FOO_REG: &str = "Windows Registry Editor Version 5.00\r\n\
                           \r\n\
                           [HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Enum\\USB\\VID_1A86&PID_55D3]\r\n\
                           \"FriendlyName\"=\"FOO\"\r\n";

    #[test]
    fn test_render_exact_content() {
        assert_eq!(render_reg(SPOOF_TARGET, "FOO"), FOO_REG);
    }

    #[test]
    fn test_render_escapes_quotes_and_backslashes() {
        let text = render_reg(SPOOF_TARGET, r#"My "fast" \ port"#);
        assert!(text.ends_with("\"FriendlyName\"=\"My \\\"fast\\\" \\\\ port\"\r\n"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        export_reg(&path, SPOOF_TARGET, "FOO").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), FOO_REG);
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        std::fs::write(&path, "stale contents that are much longer than the new file").unwrap();

        export_reg(&path, SPOOF_TARGET, "  FOO  ").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), FOO_REG);
    }

    #[test]
    fn test_empty_name_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        let err = export_reg(&path, SPOOF_TARGET, "   ").unwrap_err();

        assert!(matches!(err, ExportError::EmptyName));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join(DEFAULT_EXPORT_FILE);

        let err = export_reg(&path, SPOOF_TARGET, "FOO").unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
