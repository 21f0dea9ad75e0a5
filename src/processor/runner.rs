use crate::processor::{
    build_invocation, launch_error, step_output_path, InterpreterCandidates, ProcessorError,
    ProcessorLocator, ProcessorRef,
};
use crate::shared::logging::EventLog;
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub mode: String,
    pub input_path: PathBuf,
}

impl StepRequest {
    pub fn new(mode: impl Into<String>, input_path: impl Into<PathBuf>) -> Self {
        Self {
            mode: mode.into(),
            input_path: input_path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutput {
    pub content: String,
    pub processor: ProcessorRef,
    pub command_form: String,
}

pub struct StepRunner<'a> {
    locator: ProcessorLocator<'a>,
    interpreters: InterpreterCandidates,
    temp_dir: PathBuf,
    log: EventLog,
}

impl<'a> StepRunner<'a> {
    pub fn new(locator: ProcessorLocator<'a>, log: EventLog) -> Self {
        Self {
            locator,
            interpreters: InterpreterCandidates::default(),
            temp_dir: std::env::temp_dir(),
            log,
        }
    }

    pub fn with_interpreters(mut self, interpreters: InterpreterCandidates) -> Self {
        self.interpreters = interpreters;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn run_step(&self, request: &StepRequest) -> Result<StepOutput, ProcessorError> {
        let processor = self.locator.resolve(Some(&request.input_path))?;
        execute_step(
            &processor,
            request,
            &self.interpreters,
            &self.temp_dir,
            &self.log,
        )
    }
}

/// Runs an already resolved processor once and returns what it wrote.
///
/// Blocks until the child exits. Stderr is drained on a helper thread so a
/// chatty processor cannot stall on a full pipe.
pub fn execute_step(
    processor: &ProcessorRef,
    request: &StepRequest,
    interpreters: &InterpreterCandidates,
    temp_dir: &Path,
    log: &EventLog,
) -> Result<StepOutput, ProcessorError> {
    let output_path = step_output_path(
        temp_dir,
        &request.input_path,
        &request.mode,
        chrono::Utc::now().timestamp_millis(),
    );
    let spec = build_invocation(
        processor,
        &request.input_path,
        &output_path,
        &request.mode,
        interpreters,
    )
    .inspect_err(|err| log.error("step.failed", &err.to_string()))?;
    let command_form = spec.command_form();
    log.info("step.started", &command_form);

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| launch_error(Path::new(&spec.program), err))
        .inspect_err(|err| log.error("step.failed", &err.to_string()))?;

    let stderr_reader = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = BufReader::new(stderr).read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let waited = child.wait();
    if waited.is_err() {
        // The stderr pipe only closes once the child is gone.
        let _ = child.kill();
    }
    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();
    let status = waited.map_err(|err| launch_error(Path::new(&spec.program), err))?;

    if !status.success() {
        let exit_code = status.code().unwrap_or(-1);
        log.error(
            "step.failed",
            &format!("{command_form} exited with code {exit_code}"),
        );
        return Err(ProcessorError::ProcessorFailed { exit_code, stderr });
    }

    // Output is decoded lossily; only a failed read counts as missing output.
    let content = match fs::read(&output_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(source) => {
            log.error(
                "step.failed",
                &format!("missing output {}: {source}", output_path.display()),
            );
            return Err(ProcessorError::OutputMissing {
                path: output_path.display().to_string(),
                source,
            });
        }
    };
    let _ = fs::remove_file(&output_path);
    log.info(
        "step.finished",
        &format!("{} produced {} bytes", request.mode, content.len()),
    );

    Ok(StepOutput {
        content,
        processor: processor.clone(),
        command_form,
    })
}
