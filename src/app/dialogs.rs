use crate::processor::ProcessorChooser;
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const TEXT_EXTENSION: &str = "txt";
pub const PROCESSOR_EXTENSIONS: [&str; 2] = ["exe", "py"];

/// File choosers the boundary operations need. `None` always means the user
/// cancelled.
pub trait FileDialogs {
    fn pick_text_file(&self) -> Option<PathBuf>;
    fn save_text_file(&self, suggested_name: &str) -> Option<PathBuf>;
}

/// Line-based dialogs for terminals: prompts go to `output`, answers come
/// from `input`. An empty answer or end of input cancels a pick.
pub struct TerminalDialogs {
    input: RefCell<Box<dyn BufRead>>,
    output: RefCell<Box<dyn Write>>,
}

impl TerminalDialogs {
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn stdio() -> Self {
        Self::new(
            Box::new(std::io::BufReader::new(std::io::stdin())),
            Box::new(std::io::stderr()),
        )
    }

    fn prompt(&self, text: &str) -> Option<String> {
        {
            let mut output = self.output.borrow_mut();
            let _ = write!(output, "{text}");
            let _ = output.flush();
        }
        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn note(&self, text: &str) {
        let _ = writeln!(self.output.borrow_mut(), "{text}");
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

impl FileDialogs for TerminalDialogs {
    fn pick_text_file(&self) -> Option<PathBuf> {
        loop {
            let answer = self.prompt("Text file to open (.txt, empty to cancel): ")?;
            if answer.is_empty() {
                return None;
            }
            let path = PathBuf::from(answer);
            if has_extension(&path, &[TEXT_EXTENSION]) {
                return Some(path);
            }
            self.note("only .txt files can be opened");
        }
    }

    fn save_text_file(&self, suggested_name: &str) -> Option<PathBuf> {
        let answer = self.prompt(&format!("Export to [{suggested_name}]: "))?;
        let mut path = if answer.is_empty() {
            PathBuf::from(suggested_name)
        } else {
            PathBuf::from(answer)
        };
        if path.extension().is_none() {
            path.set_extension(TEXT_EXTENSION);
        }
        Some(path)
    }
}

impl ProcessorChooser for TerminalDialogs {
    fn choose_processor(&self, expected: &[&str]) -> Option<PathBuf> {
        self.note(&format!("processor not found ({})", expected.join(" / ")));
        let answer = self.prompt("Path to the processor (empty to cancel): ")?;
        if answer.is_empty() {
            return None;
        }
        let path = PathBuf::from(answer);
        if !has_extension(&path, &PROCESSOR_EXTENSIONS) {
            self.note("note: not an .exe or .py file, using it as a native processor");
        }
        Some(path)
    }
}

#[cfg(feature = "native-dialogs")]
pub use native::NativeDialogs;

#[cfg(feature = "native-dialogs")]
mod native {
    use super::{FileDialogs, PROCESSOR_EXTENSIONS, TEXT_EXTENSION};
    use crate::processor::ProcessorChooser;
    use std::path::PathBuf;

    /// Platform file choosers through `rfd`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NativeDialogs;

    impl FileDialogs for NativeDialogs {
        fn pick_text_file(&self) -> Option<PathBuf> {
            rfd::FileDialog::new()
                .set_title("Select a text file")
                .add_filter("Text", &[TEXT_EXTENSION])
                .pick_file()
        }

        fn save_text_file(&self, suggested_name: &str) -> Option<PathBuf> {
            rfd::FileDialog::new()
                .set_title("Export")
                .set_file_name(suggested_name)
                .add_filter("Text", &[TEXT_EXTENSION])
                .save_file()
        }
    }

    impl ProcessorChooser for NativeDialogs {
        fn choose_processor(&self, expected: &[&str]) -> Option<PathBuf> {
            rfd::FileDialog::new()
                .set_title(format!("Select the processor ({})", expected.join(" or ")))
                .add_filter("Processor", &PROCESSOR_EXTENSIONS)
                .add_filter("All files", &["*"])
                .pick_file()
        }
    }
}
