use crate::processor::KNOWN_MODES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Open,
    Run,
    Locate,
    Export,
    Config,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "open" => CliVerb::Open,
        "run" => CliVerb::Run,
        "locate" => CliVerb::Locate,
        "export" => CliVerb::Export,
        "config" => CliVerb::Config,
        "help" | "-h" | "--help" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  open                                 Pick a .txt file and print its content".to_string(),
        "  run <mode> <input> [--save]          Run a processing step and print the result"
            .to_string(),
        "  locate [<input>]                     Show which processor would be used".to_string(),
        "  export <file> [<suggested-name>]     Save a copy of a text file via the save dialog"
            .to_string(),
        "  config                               Show the per-user config and log locations"
            .to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.push(format!("Modes: {}", KNOWN_MODES.join(", ")));
    lines.join("\n")
}
