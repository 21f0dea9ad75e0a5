use crate::app::dialogs::FileDialogs;
use crate::processor::{ProcessorError, StepRequest, StepRunner};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_NAME: &str = "kimenet.txt";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("load a text file before running a step")]
    NoInputLoaded,
    #[error("nothing to export yet; run a step first")]
    NothingToExport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Canceled,
    Opened { path: PathBuf, content: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Canceled,
    Saved { path: PathBuf },
}

pub fn open_file(dialogs: &dyn FileDialogs) -> Result<OpenOutcome, AppError> {
    let Some(path) = dialogs.pick_text_file() else {
        return Ok(OpenOutcome::Canceled);
    };
    let content = read_text(&path)?;
    Ok(OpenOutcome::Opened { path, content })
}

pub fn run_step(runner: &StepRunner<'_>, mode: &str, input_path: &Path) -> Result<String, AppError> {
    let output = runner.run_step(&StepRequest::new(mode, input_path))?;
    Ok(output.content)
}

/// Writes `content` verbatim wherever the user points the save dialog.
pub fn save_output(
    dialogs: &dyn FileDialogs,
    content: &str,
    suggested_name: Option<&str>,
) -> Result<SaveOutcome, AppError> {
    let suggested = suggested_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_EXPORT_NAME);
    let Some(path) = dialogs.save_text_file(suggested) else {
        return Ok(SaveOutcome::Canceled);
    };
    fs::write(&path, content).map_err(|source| AppError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(SaveOutcome::Saved { path })
}

/// Non-UTF-8 bytes are replaced rather than rejected.
pub(crate) fn read_text(path: &Path) -> Result<String, AppError> {
    let bytes = fs::read(path).map_err(|source| AppError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
