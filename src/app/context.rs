use crate::config::{config_path, default_state_root, log_path, ConfigError, JsonFileConfigStore};
use crate::processor::{InterpreterCandidates, LocatorSettings};
use crate::shared::logging::EventLog;
use std::path::PathBuf;

/// Process-wide wiring for the boundary operations: where state lives, how
/// the processor is searched for, and which interpreters scripts may use.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub state_root: PathBuf,
    pub store: JsonFileConfigStore,
    pub log: EventLog,
    pub locator: LocatorSettings,
    pub interpreters: InterpreterCandidates,
    pub temp_dir: PathBuf,
}

impl AppContext {
    pub fn from_env() -> Result<Self, ConfigError> {
        let state_root = default_state_root()?;
        Ok(Self::at(state_root, LocatorSettings::from_env()))
    }

    pub fn at(state_root: impl Into<PathBuf>, locator: LocatorSettings) -> Self {
        let state_root = state_root.into();
        let log = EventLog::at(log_path(&state_root));
        let store = JsonFileConfigStore::new(config_path(&state_root), log.clone());
        Self {
            state_root,
            store,
            log,
            locator,
            interpreters: InterpreterCandidates::default(),
            temp_dir: std::env::temp_dir(),
        }
    }
}
