use crate::processor::ProcessorError;
use std::process::{Command, Stdio};

/// Interpreter commands tried in order for script processors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterCandidates {
    pub commands: Vec<String>,
}

impl Default for InterpreterCandidates {
    fn default() -> Self {
        Self {
            commands: vec!["python3".to_string(), "python".to_string()],
        }
    }
}

/// First command that answers `--version` with a zero exit status.
pub fn find_interpreter(candidates: &InterpreterCandidates) -> Result<String, ProcessorError> {
    candidates
        .commands
        .iter()
        .find(|command| responds_to_version(command))
        .cloned()
        .ok_or_else(|| ProcessorError::InterpreterNotFound {
            tried: candidates.commands.clone(),
        })
}

fn responds_to_version(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
