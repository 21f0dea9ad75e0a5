pub mod boundary;
pub mod cli;
pub mod commands;
pub mod context;
pub mod dialogs;
pub mod session;

pub use boundary::{open_file, run_step, save_output, AppError, OpenOutcome, SaveOutcome};
pub use commands::{run_cli, run_cli_with};
pub use context::AppContext;
pub use dialogs::{FileDialogs, TerminalDialogs};
pub use session::Session;
