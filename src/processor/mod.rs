use std::path::{Path, PathBuf};

pub mod candidates;
pub mod interpreter;
pub mod invocation;
pub mod locator;
pub mod runner;

pub use candidates::{candidate_list, Candidate, CandidateOrigin, LocatorContext};
pub use interpreter::{find_interpreter, InterpreterCandidates};
pub use invocation::{build_invocation, step_output_path, InvocationSpec};
pub use locator::{FsProbe, LocatorSettings, PathProbe, ProcessorChooser, ProcessorLocator};
pub use runner::{execute_step, StepOutput, StepRequest, StepRunner};

pub const PROCESSOR_STEM: &str = "feldolgozo";
pub const SCRIPT_EXTENSION: &str = "py";
pub const SCRIPT_FILE_NAME: &str = "feldolgozo.py";
pub const WINDOWS_BINARY_FILE_NAME: &str = "feldolgozo.exe";

/// Step tokens the bundled processor understands. The runner forwards any
/// mode unchanged; this list only feeds help text and the CLI.
pub const KNOWN_MODES: [&str; 3] = ["step1", "step2a", "step2b"];

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("processor not found ({binary} / {script}) and none was selected")]
    LocatorNotFound { binary: String, script: String },
    #[error("no script interpreter found on this system (tried {})", .tried.join(", "))]
    InterpreterNotFound { tried: Vec<String> },
    #[error("processor exited with code {exit_code}\n{stderr}")]
    ProcessorFailed { exit_code: i32, stderr: String },
    #[error("processor produced no readable output at {path}: {source}")]
    OutputMissing {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    NativeBinary,
    Script,
}

impl std::fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessorKind::NativeBinary => write!(f, "native"),
            ProcessorKind::Script => write!(f, "script"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorRef {
    pub path: PathBuf,
    pub kind: ProcessorKind,
}

impl ProcessorRef {
    /// Anything whose name ends in `.py` is a script; everything else is run
    /// directly.
    pub fn classify(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = if is_script_path(&path) {
            ProcessorKind::Script
        } else {
            ProcessorKind::NativeBinary
        };
        Self { path, kind }
    }
}

fn is_script_path(path: &Path) -> bool {
    path.to_string_lossy()
        .ends_with(&format!(".{SCRIPT_EXTENSION}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// File name of the native processor when it sits loose next to an
    /// input file.
    pub fn binary_file_name(self) -> &'static str {
        match self {
            Platform::Windows => WINDOWS_BINARY_FILE_NAME,
            Platform::MacOs | Platform::Linux => PROCESSOR_STEM,
        }
    }

    /// Location of the native processor inside a resources or install
    /// directory.
    pub fn bundled_binary_path(self) -> PathBuf {
        let dir = match self {
            Platform::Windows => "python-win",
            Platform::MacOs => "python-mac",
            Platform::Linux => "python-linux",
        };
        Path::new(dir).join(self.binary_file_name())
    }
}

pub(crate) fn launch_error(program: &Path, source: std::io::Error) -> ProcessorError {
    ProcessorError::Launch {
        program: program.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_script_extension() {
        assert_eq!(
            ProcessorRef::classify("/opt/app/feldolgozo.py").kind,
            ProcessorKind::Script
        );
        assert_eq!(
            ProcessorRef::classify("/opt/app/python-win/feldolgozo.exe").kind,
            ProcessorKind::NativeBinary
        );
        assert_eq!(
            ProcessorRef::classify("/opt/app/feldolgozo").kind,
            ProcessorKind::NativeBinary
        );
        assert_eq!(
            ProcessorRef::classify("/opt/app/feldolgozo.pyc").kind,
            ProcessorKind::NativeBinary
        );
    }

    #[test]
    fn platform_binary_locations() {
        assert_eq!(
            Platform::Windows.bundled_binary_path(),
            Path::new("python-win").join("feldolgozo.exe")
        );
        assert_eq!(
            Platform::MacOs.bundled_binary_path(),
            Path::new("python-mac").join("feldolgozo")
        );
        assert_eq!(Platform::Linux.binary_file_name(), "feldolgozo");
    }

    #[test]
    fn not_found_message_names_both_expected_files() {
        let err = ProcessorError::LocatorNotFound {
            binary: WINDOWS_BINARY_FILE_NAME.to_string(),
            script: SCRIPT_FILE_NAME.to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("feldolgozo.exe"));
        assert!(message.contains("feldolgozo.py"));
    }

    #[test]
    fn failure_message_carries_stderr() {
        let err = ProcessorError::ProcessorFailed {
            exit_code: 2,
            stderr: "bad input".to_string(),
        };
        assert_eq!(err.to_string(), "processor exited with code 2\nbad input");
    }
}
