use super::{ConfigError, PersistedConfig};
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::logging::EventLog;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the processor preference lives between runs.
///
/// `load` never fails: a missing, unreadable or malformed record is an empty
/// one. `save` replaces the whole record.
pub trait ConfigStore {
    fn load(&self) -> PersistedConfig;
    fn save(&self, config: &PersistedConfig) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    log: EventLog,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>, log: EventLog) -> Self {
        Self {
            path: path.into(),
            log,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn load(&self) -> PersistedConfig {
        if !self.path.exists() {
            return PersistedConfig::default();
        }
        match PersistedConfig::from_path(&self.path) {
            Ok(config) => config,
            Err(err) => {
                self.log
                    .warn("config.recovered", &format!("using empty config: {err}"));
                PersistedConfig::default()
            }
        }
    }

    fn save(&self, config: &PersistedConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let body = config.to_json(&self.path)?;
        atomic_write_file(&self.path, body.as_bytes()).map_err(|source| ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        self.log.info(
            "config.saved",
            &format!("wrote {}", self.path.display()),
        );
        Ok(())
    }
}

/// In-process store for callers that must not touch the user's real config.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<PersistedConfig>,
    saves: Mutex<usize>,
}

impl MemoryConfigStore {
    pub fn new(config: PersistedConfig) -> Self {
        Self {
            config: Mutex::new(config),
            saves: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> PersistedConfig {
        self.config
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    fn save(&self, config: &PersistedConfig) -> Result<(), ConfigError> {
        *self.config.lock().unwrap_or_else(|err| err.into_inner()) = config.clone();
        *self.saves.lock().unwrap_or_else(|err| err.into_inner()) += 1;
        Ok(())
    }
}
