/* src/migration.rs */

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::info;

use crate::error::{RegionError, Result};

/// Option key holding the last installed theme version.
pub const THEME_VERSION_KEY: &str = "hello_theme_version";

/// Persisted key/value settings owned by the host platform.
pub trait VersionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process `VersionStore`, mainly for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for MemoryVersionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| RegionError::Config("version store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn components(version: &str) -> Result<Vec<u64>> {
    version
        .trim()
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| RegionError::InvalidVersion(version.to_string()))
        })
        .collect()
}

/// Compare dotted numeric versions; missing trailing components count as 0.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let (a, b) = (components(a)?, components(b)?);
    let len = a.len().max(b.len());
    for i in 0..len {
        let (x, y) = (a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0));
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

/// Record `current` as the installed theme version when the stored one is
/// missing, empty, or older. Returns whether the store was written.
///
/// A stored value that is not a valid version is overwritten.
pub fn maybe_update_version<S: VersionStore + ?Sized>(store: &S, current: &str) -> Result<bool> {
    components(current)?;

    let needs_update = match store.get(THEME_VERSION_KEY) {
        None => true,
        Some(stored) if stored.trim().is_empty() => true,
        Some(stored) => match compare_versions(&stored, current) {
            Ok(ordering) => ordering == Ordering::Less,
            Err(_) => true,
        },
    };

    if needs_update {
        store.set(THEME_VERSION_KEY, current)?;
        info!(version = current, "recorded theme version");
    }
    Ok(needs_update)
}
