use crate::processor::{
    find_interpreter, InterpreterCandidates, ProcessorError, ProcessorKind, ProcessorRef,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl InvocationSpec {
    pub fn command_form(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `<processor> <input> <output> --mode <mode>`, with the interpreter in
/// front for script processors.
pub fn build_invocation(
    processor: &ProcessorRef,
    input_path: &Path,
    output_path: &Path,
    mode: &str,
    interpreters: &InterpreterCandidates,
) -> Result<InvocationSpec, ProcessorError> {
    let step_args = [
        input_path.as_os_str().to_os_string(),
        output_path.as_os_str().to_os_string(),
        OsString::from("--mode"),
        OsString::from(mode),
    ];
    match processor.kind {
        ProcessorKind::NativeBinary => Ok(InvocationSpec {
            program: processor.path.as_os_str().to_os_string(),
            args: step_args.to_vec(),
        }),
        ProcessorKind::Script => {
            let interpreter = find_interpreter(interpreters)?;
            let mut args = vec![processor.path.as_os_str().to_os_string()];
            args.extend(step_args);
            Ok(InvocationSpec {
                program: OsString::from(interpreter),
                args,
            })
        }
    }
}

/// `<temp>/<input file name>.<mode>.<unix millis>.out.txt`
pub fn step_output_path(temp_dir: &Path, input_path: &Path, mode: &str, millis: i64) -> PathBuf {
    let base = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    temp_dir.join(format!("{base}.{mode}.{millis}.out.txt"))
}
