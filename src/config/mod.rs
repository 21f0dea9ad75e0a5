use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub mod error;
pub mod paths;
pub mod store;

pub use error::ConfigError;
pub use paths::{config_path, default_state_root, log_path};
pub use store::{ConfigStore, JsonFileConfigStore, MemoryConfigStore};

/// The per-user preference record.
///
/// Only `processorPath` is understood. Every other key found in the file is
/// kept in `extra` so a rewrite does not drop it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedConfig {
    #[serde(
        rename = "processorPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub processor_path: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PersistedConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn to_json(&self, path: &Path) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|source| ConfigError::Encode {
            path: path.display().to_string(),
            source,
        })
    }

    /// The persisted processor path, ignoring blank values.
    pub fn processor_path(&self) -> Option<&str> {
        self.processor_path
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn with_processor_path(mut self, path: &Path) -> Self {
        self.processor_path = Some(path.display().to_string());
        self
    }
}
