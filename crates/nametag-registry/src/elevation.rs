//! Administrative privilege check
//!
//! Writes under `HKLM\SYSTEM\CurrentControlSet\Enum` need an elevated
//! process. A check that cannot be answered counts as "not elevated".

use tracing::debug;

/// Answers whether the process may write protected registry branches
pub trait PrivilegeCheck {
    fn is_elevated(&self) -> bool;
}

/// Privileges of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPrivileges;

impl PrivilegeCheck for ProcessPrivileges {
    #[cfg(windows)]
    fn is_elevated(&self) -> bool {
        let elevated = crate::windows::is_user_an_admin();
        debug!("Process elevated: {}", elevated);
        elevated
    }

    #[cfg(not(windows))]
    fn is_elevated(&self) -> bool {
        debug!("No administrator check on this platform; treating as not elevated");
        false
    }
}

/// Fixed answer, for tests and simulation
#[derive(Debug, Clone, Copy)]
pub struct FixedPrivileges(pub bool);

impl PrivilegeCheck for FixedPrivileges {
    fn is_elevated(&self) -> bool {
        self.0
    }
}
