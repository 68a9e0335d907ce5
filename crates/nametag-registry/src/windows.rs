//! Win32 implementations: registry, configuration manager, shell privilege query

use std::iter;
use std::ptr;

use tracing::{debug, warn};
use windows_sys::Win32::Devices::DeviceAndDriverInstallation::{
    CM_Locate_DevNodeW, CM_Reenumerate_DevNode, CM_LOCATE_DEVNODE_NORMAL, CM_REENUMERATE_NORMAL,
    CR_SUCCESS,
};
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS,
    ERROR_UNSUPPORTED_TYPE, WIN32_ERROR,
};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegEnumKeyExW, RegGetValueW, RegOpenKeyExW, RegSetValueExW,
    HKEY, HKEY_LOCAL_MACHINE, KEY_ALL_ACCESS, KEY_READ, REG_SAM_FLAGS, REG_SZ, RRF_RT_REG_SZ,
};
use windows_sys::Win32::UI::Shell::IsUserAnAdmin;

use crate::backend::RegistryBackend;
use crate::error::{RegistryError, RescanError};
use crate::rescan::{DevNode, DeviceTree};

/// Longest key name RegEnumKeyExW can return, plus the terminator
const MAX_KEY_NAME: usize = 256;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(iter::once(0)).collect()
}

fn check(status: WIN32_ERROR, path: &str) -> Result<(), RegistryError> {
    match status {
        ERROR_SUCCESS => Ok(()),
        ERROR_FILE_NOT_FOUND => Err(RegistryError::KeyNotFound(path.to_string())),
        ERROR_ACCESS_DENIED => Err(RegistryError::AccessDenied(path.to_string())),
        code => Err(RegistryError::Os {
            path: path.to_string(),
            code,
        }),
    }
}

/// Whether a REG_SZ read status means there is no string value to snapshot
///
/// A value stored with another type cannot be written back as REG_SZ
/// unchanged, so it is treated like a missing one.
fn no_string_value(status: WIN32_ERROR) -> bool {
    matches!(status, ERROR_FILE_NOT_FOUND | ERROR_UNSUPPORTED_TYPE)
}

/// An open HKLM subkey, closed on drop
struct OwnedKey(HKEY);

impl OwnedKey {
    fn open(path: &str, access: REG_SAM_FLAGS) -> Result<Self, RegistryError> {
        let subkey = wide(path);
        let mut key: HKEY = ptr::null_mut();
        // SAFETY: `subkey` is NUL-terminated and outlives the call; `key` is a valid out pointer.
        let status = unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, subkey.as_ptr(), 0, access, &mut key) };
        check(status, path)?;
        Ok(Self(key))
    }
}

impl Drop for OwnedKey {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful RegOpenKeyExW and is closed once.
        let _ = unsafe { RegCloseKey(self.0) };
    }
}

/// The live registry under HKEY_LOCAL_MACHINE
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

impl RegistryBackend for WindowsRegistry {
    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        let key = OwnedKey::open(path, KEY_READ)?;
        let mut names = Vec::new();
        let mut buf = [0u16; MAX_KEY_NAME];

        for index in 0u32.. {
            let mut len = buf.len() as u32;
            // SAFETY: `buf` holds `len` u16s; the optional out pointers are null.
            let status = unsafe {
                RegEnumKeyExW(
                    key.0,
                    index,
                    buf.as_mut_ptr(),
                    &mut len,
                    ptr::null(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            check(status, path)?;
            names.push(String::from_utf16_lossy(&buf[..len as usize]));
        }

        debug!("{} has {} subkey(s)", path, names.len());
        Ok(names)
    }

    fn read_string(&self, path: &str, value: &str) -> Result<Option<String>, RegistryError> {
        let key = OwnedKey::open(path, KEY_READ)?;
        let name = wide(value);

        let mut size = 0u32;
        // SAFETY: size query; data pointer is null and `size` is a valid out pointer.
        let status = unsafe {
            RegGetValueW(
                key.0,
                ptr::null(),
                name.as_ptr(),
                RRF_RT_REG_SZ,
                ptr::null_mut(),
                ptr::null_mut(),
                &mut size,
            )
        };
        if status == ERROR_UNSUPPORTED_TYPE {
            warn!("{} on {} is not a string value; ignoring it", value, path);
        }
        if no_string_value(status) {
            return Ok(None);
        }
        check(status, path)?;

        let mut data = vec![0u16; (size as usize).div_ceil(2)];
        let mut size = (data.len() * 2) as u32;
        // SAFETY: `data` holds `size` bytes.
        let status = unsafe {
            RegGetValueW(
                key.0,
                ptr::null(),
                name.as_ptr(),
                RRF_RT_REG_SZ,
                ptr::null_mut(),
                data.as_mut_ptr().cast(),
                &mut size,
            )
        };
        check(status, path)?;

        let chars = (size as usize / 2).min(data.len());
        let text = &data[..chars];
        let end = text.iter().position(|&c| c == 0).unwrap_or(text.len());
        Ok(Some(String::from_utf16_lossy(&text[..end])))
    }

    fn write_string(&mut self, path: &str, value: &str, data: &str) -> Result<(), RegistryError> {
        let key = OwnedKey::open(path, KEY_ALL_ACCESS)?;
        let name = wide(value);
        let data = wide(data);
        // SAFETY: `data` is NUL-terminated REG_SZ; the byte count covers the terminator.
        let status = unsafe {
            RegSetValueExW(
                key.0,
                name.as_ptr(),
                0,
                REG_SZ,
                data.as_ptr().cast(),
                (data.len() * 2) as u32,
            )
        };
        check(status, path)
    }

    fn delete_value(&mut self, path: &str, value: &str) -> Result<(), RegistryError> {
        let key = OwnedKey::open(path, KEY_ALL_ACCESS)?;
        let name = wide(value);
        // SAFETY: `name` is NUL-terminated.
        let status = unsafe { RegDeleteValueW(key.0, name.as_ptr()) };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(());
        }
        check(status, path)
    }
}

/// The configuration manager device tree (cfgmgr32)
#[derive(Debug, Clone, Copy, Default)]
pub struct CfgMgrDeviceTree;

impl DeviceTree for CfgMgrDeviceTree {
    fn locate_root(&self) -> Result<DevNode, RescanError> {
        let mut node: u32 = 0;
        // SAFETY: a null device ID selects the root of the device tree.
        let status = unsafe { CM_Locate_DevNodeW(&mut node, ptr::null(), CM_LOCATE_DEVNODE_NORMAL) };
        if status != CR_SUCCESS {
            return Err(RescanError::LocateFailed(status));
        }
        Ok(node)
    }

    fn reenumerate(&self, node: DevNode) -> Result<(), RescanError> {
        // SAFETY: `node` came from CM_Locate_DevNodeW.
        let status = unsafe { CM_Reenumerate_DevNode(node, CM_REENUMERATE_NORMAL) };
        if status != CR_SUCCESS {
            return Err(RescanError::ReenumerateFailed(status));
        }
        Ok(())
    }
}

/// Whether the current process token is in the Administrators group
pub(crate) fn is_user_an_admin() -> bool {
    // SAFETY: no arguments; returns a BOOL.
    unsafe { IsUserAnAdmin() != 0 }
}
