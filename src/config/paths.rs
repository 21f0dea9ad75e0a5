use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const STATE_ROOT_ENV: &str = "KOZEPELO_HOME";
pub const GLOBAL_STATE_DIR: &str = ".kozepelo";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "kozepelo.log";

/// Per-user directory holding the persisted config and the event log.
///
/// `KOZEPELO_HOME` wins when set; otherwise `$HOME/.kozepelo`.
pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    if let Some(root) = std::env::var_os(STATE_ROOT_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    let home = std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn config_path(state_root: &Path) -> PathBuf {
    state_root.join(CONFIG_FILE_NAME)
}

pub fn log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs").join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        saved: Vec<(&'static str, Option<OsString>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
            let mut saved = Vec::new();
            for (key, value) in vars {
                saved.push((*key, std::env::var_os(key)));
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.drain(..) {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn state_root_prefers_explicit_override() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let _guard = EnvGuard::set(&[
            (STATE_ROOT_ENV, Some("/srv/kozepelo-state")),
            ("HOME", Some("/home/someone")),
        ]);
        assert_eq!(
            default_state_root().expect("state root"),
            PathBuf::from("/srv/kozepelo-state")
        );
    }

    #[test]
    fn state_root_falls_back_to_home() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let _guard = EnvGuard::set(&[(STATE_ROOT_ENV, None), ("HOME", Some("/home/someone"))]);
        assert_eq!(
            default_state_root().expect("state root"),
            PathBuf::from("/home/someone/.kozepelo")
        );
    }

    #[test]
    fn state_root_requires_some_home() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let _guard = EnvGuard::set(&[(STATE_ROOT_ENV, None), ("HOME", None)]);
        assert!(matches!(
            default_state_root(),
            Err(ConfigError::HomeDirectoryUnavailable)
        ));
    }

    #[test]
    fn config_and_log_live_under_state_root() {
        let root = Path::new("/state");
        assert_eq!(config_path(root), PathBuf::from("/state/config.json"));
        assert_eq!(log_path(root), PathBuf::from("/state/logs/kozepelo.log"));
    }
}
