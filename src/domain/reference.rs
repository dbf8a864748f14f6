//! Reference snapshot: the last-known version metadata for a dependency

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which every snapshot records the version identifier
pub const VERSION_KEY: &str = "version";

/// Opaque version metadata for one dependency, the baseline a probe
/// compares against. At minimum carries a `version` key; probes may add
/// ecosystem-specific keys (e.g. a SONAME). A snapshot is replaced
/// wholesale by the one a probe returns, never patched field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceSnapshot(BTreeMap<String, String>);

impl ReferenceSnapshot {
    /// Creates an empty snapshot (the baseline for an unseen dependency)
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded version identifier, if any
    pub fn version(&self) -> Option<&str> {
        self.get(VERSION_KEY)
    }

    /// Returns the value for a metadata key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets a metadata key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns true if no metadata has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the metadata entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReferenceSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
