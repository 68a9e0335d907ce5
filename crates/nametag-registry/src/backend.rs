//! Registry access behind a trait
//!
//! All paths are relative to `HKEY_LOCAL_MACHINE` and use `\` separators.
//! Lookups are case-insensitive, as in the real registry.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RegistryError;

/// Minimal registry surface the namer needs
pub trait RegistryBackend {
    /// Names of the immediate child keys of `path`
    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError>;

    /// Read a string value; `Ok(None)` if the key exists but the value does not
    fn read_string(&self, path: &str, value: &str) -> Result<Option<String>, RegistryError>;

    /// Set a string (REG_SZ) value on an existing key
    fn write_string(&mut self, path: &str, value: &str, data: &str) -> Result<(), RegistryError>;

    /// Remove a value; removing a value that is already absent succeeds
    fn delete_value(&mut self, path: &str, value: &str) -> Result<(), RegistryError>;
}

/// Backend for platforms without a registry
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRegistry;

impl RegistryBackend for UnsupportedRegistry {
    fn subkeys(&self, _path: &str) -> Result<Vec<String>, RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn read_string(&self, _path: &str, _value: &str) -> Result<Option<String>, RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn write_string(&mut self, _path: &str, _value: &str, _data: &str) -> Result<(), RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn delete_value(&mut self, _path: &str, _value: &str) -> Result<(), RegistryError> {
        Err(RegistryError::Unsupported)
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryKey {
    /// Path with its original casing
    path: String,
    /// Lowercased value name -> (value name, data)
    values: BTreeMap<String, (String, String)>,
}

/// In-memory registry with write-failure injection
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    /// Lowercased path -> key
    keys: BTreeMap<String, MemoryKey>,
    /// Lowercased paths whose writes fail with access denied
    denied: BTreeSet<String>,
    /// Writes allowed before every further write fails
    write_budget: Option<usize>,
    /// Successful writes and deletes so far
    writes: usize,
}

fn fold(path: &str) -> String {
    path.to_ascii_lowercase()
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a key and any missing parents
    pub fn create_key(&mut self, path: &str) {
        let mut prefix = String::new();
        for segment in path.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(segment);
            self.keys
                .entry(fold(&prefix))
                .or_insert_with(|| MemoryKey {
                    path: prefix.clone(),
                    ..Default::default()
                });
        }
    }

    /// Create a key holding one string value
    pub fn insert_value(&mut self, path: &str, value: &str, data: &str) {
        self.create_key(path);
        if let Some(key) = self.keys.get_mut(&fold(path)) {
            key.values
                .insert(fold(value), (value.to_string(), data.to_string()));
        }
    }

    /// Make writes under exactly `path` fail with access denied
    pub fn deny_writes(&mut self, path: &str) {
        self.denied.insert(fold(path));
    }

    /// Fail every write after the first `limit` successful ones
    pub fn fail_writes_after(&mut self, limit: usize) {
        self.write_budget = Some(limit);
    }

    /// Number of successful writes and deletes
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Whether a key exists
    pub fn has_key(&self, path: &str) -> bool {
        self.keys.contains_key(&fold(path))
    }

    /// Current string value, if any
    pub fn value(&self, path: &str, value: &str) -> Option<&str> {
        self.keys
            .get(&fold(path))
            .and_then(|key| key.values.get(&fold(value)))
            .map(|(_, data)| data.as_str())
    }

    fn writable_key(&mut self, path: &str) -> Result<&mut MemoryKey, RegistryError> {
        let folded = fold(path);
        if self.denied.contains(&folded) {
            return Err(RegistryError::AccessDenied(path.to_string()));
        }
        if self.write_budget.is_some_and(|budget| self.writes >= budget) {
            return Err(RegistryError::Os {
                path: path.to_string(),
                // ERROR_NO_SYSTEM_RESOURCES
                code: 1450,
            });
        }
        self.keys
            .get_mut(&folded)
            .ok_or_else(|| RegistryError::KeyNotFound(path.to_string()))
    }
}

impl RegistryBackend for MemoryRegistry {
    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        let parent = fold(path);
        if !self.keys.contains_key(&parent) {
            return Err(RegistryError::KeyNotFound(path.to_string()));
        }

        let prefix = format!("{}\\", parent);
        Ok(self
            .keys
            .iter()
            .filter(|(folded, _)| {
                folded
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('\\'))
            })
            .filter_map(|(_, key)| key.path.rsplit('\\').next().map(str::to_string))
            .collect())
    }

    fn read_string(&self, path: &str, value: &str) -> Result<Option<String>, RegistryError> {
        let key = self
            .keys
            .get(&fold(path))
            .ok_or_else(|| RegistryError::KeyNotFound(path.to_string()))?;
        Ok(key.values.get(&fold(value)).map(|(_, data)| data.clone()))
    }

    fn write_string(&mut self, path: &str, value: &str, data: &str) -> Result<(), RegistryError> {
        let key = self.writable_key(path)?;
        key.values
            .insert(fold(value), (value.to_string(), data.to_string()));
        self.writes += 1;
        Ok(())
    }

    fn delete_value(&mut self, path: &str, value: &str) -> Result<(), RegistryError> {
        let key = self.writable_key(path)?;
        key.values.remove(&fold(value));
        self.writes += 1;
        Ok(())
    }
}
