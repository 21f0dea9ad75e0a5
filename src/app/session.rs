use crate::app::boundary::{
    open_file, save_output, AppError, OpenOutcome, SaveOutcome, DEFAULT_EXPORT_NAME,
};
use crate::app::dialogs::FileDialogs;
use crate::processor::{StepRequest, StepRunner};
use std::path::{Path, PathBuf};

/// What the front-end remembers between user actions: the loaded file, the
/// text currently shown, and the step that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    input_path: Option<PathBuf>,
    last_output: String,
    last_mode: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    pub fn last_mode(&self) -> Option<&str> {
        self.last_mode.as_deref()
    }

    /// Shows the raw file and clears the active step. A cancelled dialog
    /// leaves the session untouched.
    pub fn open(&mut self, dialogs: &dyn FileDialogs) -> Result<OpenOutcome, AppError> {
        let outcome = open_file(dialogs)?;
        if let OpenOutcome::Opened { path, content } = &outcome {
            self.load(path.clone(), content.clone());
        }
        Ok(outcome)
    }

    pub fn load(&mut self, path: PathBuf, content: String) {
        self.input_path = Some(path);
        self.last_output = content;
        self.last_mode = None;
    }

    /// Selects the file steps run against without showing its content.
    pub fn set_input(&mut self, path: PathBuf) {
        self.input_path = Some(path);
        self.last_mode = None;
    }

    /// On failure the previous output stays as it was.
    pub fn run(&mut self, runner: &StepRunner<'_>, mode: &str) -> Result<&str, AppError> {
        let input = self.input_path.clone().ok_or(AppError::NoInputLoaded)?;
        self.last_mode = Some(mode.to_string());
        let output = runner.run_step(&StepRequest::new(mode, input))?;
        self.last_output = output.content;
        Ok(&self.last_output)
    }

    /// `<input file name>.<mode>.txt`, or the generic name when no file is
    /// loaded.
    pub fn suggested_export_name(&self) -> String {
        let Some(base) = self
            .input_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
        else {
            return DEFAULT_EXPORT_NAME.to_string();
        };
        match &self.last_mode {
            Some(mode) => format!("{base}.{mode}.txt"),
            None => format!("{base}.txt"),
        }
    }

    pub fn export(&self, dialogs: &dyn FileDialogs) -> Result<SaveOutcome, AppError> {
        if self.last_output.is_empty() {
            return Err(AppError::NothingToExport);
        }
        save_output(
            dialogs,
            &self.last_output,
            Some(&self.suggested_export_name()),
        )
    }
}
