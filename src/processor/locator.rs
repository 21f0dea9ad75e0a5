use crate::config::ConfigStore;
use crate::processor::{
    candidate_list, LocatorContext, Platform, ProcessorError, ProcessorRef, SCRIPT_FILE_NAME,
};
use crate::shared::logging::EventLog;
use std::path::{Path, PathBuf};

pub const RESOURCES_DIR_ENV: &str = "KOZEPELO_RESOURCES_DIR";

pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Existence checks against the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Interactive last resort when no candidate exists. `expected` holds the
/// file names the caller was looking for; `None` means the user cancelled.
pub trait ProcessorChooser {
    fn choose_processor(&self, expected: &[&str]) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSettings {
    pub platform: Platform,
    pub resources_dir: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
}

impl LocatorSettings {
    /// The install directory is the one holding the running executable. A
    /// packaged build is recognised by `KOZEPELO_RESOURCES_DIR`, a
    /// `resources/` directory beside the executable, or on macOS the bundle's
    /// `Contents/Resources`.
    pub fn from_env() -> Self {
        let platform = Platform::current();
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let resources_dir = std::env::var_os(RESOURCES_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                install_dir
                    .as_deref()
                    .and_then(|dir| packaged_resources_dir(platform, dir))
            });
        Self {
            platform,
            resources_dir,
            install_dir,
        }
    }
}

fn packaged_resources_dir(platform: Platform, install_dir: &Path) -> Option<PathBuf> {
    let mut dirs = vec![install_dir.join("resources")];
    if platform == Platform::MacOs {
        if let Some(contents) = install_dir.parent() {
            dirs.push(contents.join("Resources"));
        }
    }
    dirs.into_iter().find(|dir| dir.is_dir())
}

pub struct ProcessorLocator<'a> {
    settings: &'a LocatorSettings,
    store: &'a dyn ConfigStore,
    chooser: &'a dyn ProcessorChooser,
    probe: &'a dyn PathProbe,
    log: EventLog,
}

impl<'a> ProcessorLocator<'a> {
    pub fn new(
        settings: &'a LocatorSettings,
        store: &'a dyn ConfigStore,
        chooser: &'a dyn ProcessorChooser,
        probe: &'a dyn PathProbe,
        log: EventLog,
    ) -> Self {
        Self {
            settings,
            store,
            chooser,
            probe,
            log,
        }
    }

    /// Finds the processor for one invocation. Nothing is cached: every
    /// call re-reads the config and re-checks each candidate on disk.
    pub fn resolve(&self, input_path: Option<&Path>) -> Result<ProcessorRef, ProcessorError> {
        let persisted = self.store.load();
        let ctx = LocatorContext {
            platform: self.settings.platform,
            resources_dir: self.settings.resources_dir.as_deref(),
            install_dir: self.settings.install_dir.as_deref(),
            input_path,
            persisted: &persisted,
        };

        for candidate in candidate_list(&ctx) {
            if self.probe.exists(&candidate.path) {
                let resolved = ProcessorRef::classify(candidate.path);
                self.log.info(
                    "processor.resolved",
                    &format!(
                        "{} ({}, from {:?})",
                        resolved.path.display(),
                        resolved.kind,
                        candidate.origin
                    ),
                );
                return Ok(resolved);
            }
        }

        let binary = self.settings.platform.binary_file_name();
        let Some(chosen) = self.chooser.choose_processor(&[binary, SCRIPT_FILE_NAME]) else {
            self.log.warn(
                "processor.not_found",
                "no candidate exists and selection was cancelled",
            );
            return Err(ProcessorError::LocatorNotFound {
                binary: binary.to_string(),
                script: SCRIPT_FILE_NAME.to_string(),
            });
        };

        if chosen.to_str().is_some() {
            let updated = persisted.with_processor_path(&chosen);
            if let Err(err) = self.store.save(&updated) {
                self.log.warn("config.persist_failed", &err.to_string());
            }
        } else {
            // A lossy copy would name a different file on the next run.
            self.log.warn(
                "config.persist_skipped",
                &format!("processor path is not valid UTF-8: {}", chosen.display()),
            );
        }
        let resolved = ProcessorRef::classify(chosen);
        self.log.info(
            "processor.chosen",
            &format!("{} ({})", resolved.path.display(), resolved.kind),
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigStore, PersistedConfig};
    use crate::processor::ProcessorKind;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    struct FakeProbe {
        existing: RefCell<HashSet<PathBuf>>,
    }

    impl FakeProbe {
        fn with(paths: &[&str]) -> Self {
            Self {
                existing: RefCell::new(paths.iter().map(PathBuf::from).collect()),
            }
        }

        fn add(&self, path: &Path) {
            self.existing.borrow_mut().insert(path.to_path_buf());
        }
    }

    impl PathProbe for FakeProbe {
        fn exists(&self, path: &Path) -> bool {
            self.existing.borrow().contains(path)
        }
    }

    struct ScriptedChooser {
        answer: Option<PathBuf>,
        calls: Cell<usize>,
        expected_seen: RefCell<Vec<String>>,
    }

    impl ScriptedChooser {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: answer.map(PathBuf::from),
                calls: Cell::new(0),
                expected_seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessorChooser for ScriptedChooser {
        fn choose_processor(&self, expected: &[&str]) -> Option<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            *self.expected_seen.borrow_mut() = expected.iter().map(|s| s.to_string()).collect();
            self.answer.clone()
        }
    }

    fn settings() -> LocatorSettings {
        LocatorSettings {
            platform: Platform::Windows,
            resources_dir: Some(PathBuf::from("/app/resources")),
            install_dir: Some(PathBuf::from("/app")),
        }
    }

    fn resolve_with(
        probe: &FakeProbe,
        store: &MemoryConfigStore,
        chooser: &ScriptedChooser,
        input: Option<&str>,
    ) -> Result<ProcessorRef, ProcessorError> {
        let settings = settings();
        let locator = ProcessorLocator::new(&settings, store, chooser, probe, EventLog::disabled());
        locator.resolve(input.map(Path::new))
    }

    #[test]
    fn single_existing_candidate_is_returned_with_its_kind() {
        let cases = [
            ("/app/resources/python-win/feldolgozo.exe", ProcessorKind::NativeBinary),
            ("/app/resources/feldolgozo.py", ProcessorKind::Script),
            ("/app/python-win/feldolgozo.exe", ProcessorKind::NativeBinary),
            ("/app/feldolgozo.py", ProcessorKind::Script),
            ("/data/feldolgozo.exe", ProcessorKind::NativeBinary),
            ("/data/feldolgozo.py", ProcessorKind::Script),
        ];
        for (path, kind) in cases {
            let probe = FakeProbe::with(&[path]);
            let store = MemoryConfigStore::default();
            let chooser = ScriptedChooser::answering(None);
            let resolved =
                resolve_with(&probe, &store, &chooser, Some("/data/in.txt")).expect("resolved");
            assert_eq!(resolved.path, PathBuf::from(path));
            assert_eq!(resolved.kind, kind, "kind for {path}");
            assert_eq!(chooser.calls.get(), 0);
        }
    }

    #[test]
    fn lowest_priority_index_wins_when_several_exist() {
        let probe = FakeProbe::with(&[
            "/saved/feldolgozo.exe",
            "/data/feldolgozo.py",
            "/app/feldolgozo.py",
            "/app/resources/feldolgozo.py",
        ]);
        let store = MemoryConfigStore::new(
            PersistedConfig::default().with_processor_path(Path::new("/saved/feldolgozo.exe")),
        );
        let chooser = ScriptedChooser::answering(None);

        let resolved =
            resolve_with(&probe, &store, &chooser, Some("/data/in.txt")).expect("resolved");
        assert_eq!(resolved.path, PathBuf::from("/app/resources/feldolgozo.py"));
        assert_eq!(resolved.kind, ProcessorKind::Script);
    }

    #[test]
    fn persisted_path_is_used_after_bundled_candidates_are_missing() {
        let probe = FakeProbe::with(&["/saved/feldolgozo.exe"]);
        let store = MemoryConfigStore::new(
            PersistedConfig::default().with_processor_path(Path::new("/saved/feldolgozo.exe")),
        );
        let chooser = ScriptedChooser::answering(None);

        let resolved = resolve_with(&probe, &store, &chooser, None).expect("resolved");
        assert_eq!(resolved.path, PathBuf::from("/saved/feldolgozo.exe"));
        assert_eq!(resolved.kind, ProcessorKind::NativeBinary);
    }

    #[test]
    fn stale_persisted_path_falls_through_to_chooser() {
        let probe = FakeProbe::with(&[]);
        let store = MemoryConfigStore::new(
            PersistedConfig::default().with_processor_path(Path::new("/gone/feldolgozo.exe")),
        );
        let chooser = ScriptedChooser::answering(None);

        let err = resolve_with(&probe, &store, &chooser, None).expect_err("not found");
        assert!(matches!(err, ProcessorError::LocatorNotFound { .. }));
        assert_eq!(chooser.calls.get(), 1);
    }

    #[test]
    fn cancelled_chooser_fails_and_never_writes_config() {
        let probe = FakeProbe::with(&[]);
        let store = MemoryConfigStore::default();
        let chooser = ScriptedChooser::answering(None);

        let err = resolve_with(&probe, &store, &chooser, Some("/data/in.txt")).expect_err("fail");
        match err {
            ProcessorError::LocatorNotFound { binary, script } => {
                assert_eq!(binary, "feldolgozo.exe");
                assert_eq!(script, "feldolgozo.py");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.save_count(), 0);
        assert_eq!(
            *chooser.expected_seen.borrow(),
            vec!["feldolgozo.exe".to_string(), "feldolgozo.py".to_string()]
        );
    }

    #[test]
    fn chosen_processor_is_persisted_and_reused_without_prompting() {
        let probe = FakeProbe::with(&[]);
        let store = MemoryConfigStore::new(PersistedConfig {
            processor_path: None,
            extra: [("theme".to_string(), serde_json::json!("dark"))]
                .into_iter()
                .collect(),
        });
        let chooser = ScriptedChooser::answering(Some("/picked/feldolgozo.py"));

        let first = resolve_with(&probe, &store, &chooser, None).expect("chosen");
        assert_eq!(first.path, PathBuf::from("/picked/feldolgozo.py"));
        assert_eq!(first.kind, ProcessorKind::Script);
        assert_eq!(store.load().processor_path(), Some("/picked/feldolgozo.py"));
        assert_eq!(store.load().extra["theme"], "dark");
        assert_eq!(store.save_count(), 1);

        probe.add(Path::new("/picked/feldolgozo.py"));
        let second = resolve_with(&probe, &store, &chooser, None).expect("persisted");
        assert_eq!(second, first);
        assert_eq!(chooser.calls.get(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_pick_is_used_but_not_persisted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let picked = PathBuf::from(OsStr::from_bytes(b"/picked/feldolgoz\xf6"));
        let probe = FakeProbe::with(&[]);
        let store = MemoryConfigStore::default();
        let chooser = ScriptedChooser {
            answer: Some(picked.clone()),
            calls: Cell::new(0),
            expected_seen: RefCell::new(Vec::new()),
        };

        let resolved = resolve_with(&probe, &store, &chooser, None).expect("chosen");
        assert_eq!(resolved.path, picked);
        assert_eq!(resolved.kind, ProcessorKind::NativeBinary);
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.load().processor_path(), None);
    }

    #[test]
    fn packaged_resources_dir_detection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let install = dir.path().join("bin");
        std::fs::create_dir_all(&install).expect("mkdir");
        assert_eq!(packaged_resources_dir(Platform::Linux, &install), None);

        std::fs::create_dir_all(install.join("resources")).expect("mkdir resources");
        assert_eq!(
            packaged_resources_dir(Platform::Linux, &install),
            Some(install.join("resources"))
        );
    }

    #[test]
    fn macos_bundle_resources_are_found_next_to_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let contents = dir.path().join("Kozepelo.app/Contents");
        let macos = contents.join("MacOS");
        std::fs::create_dir_all(&macos).expect("mkdir macos");
        std::fs::create_dir_all(contents.join("Resources")).expect("mkdir resources");

        assert_eq!(
            packaged_resources_dir(Platform::MacOs, &macos),
            Some(contents.join("Resources"))
        );
        assert_eq!(packaged_resources_dir(Platform::Linux, &macos), None);
    }
}
