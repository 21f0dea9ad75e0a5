use crate::app::boundary::{read_text, save_output, OpenOutcome, SaveOutcome};
use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::context::AppContext;
use crate::app::dialogs::FileDialogs;
use crate::app::session::Session;
use crate::config::ConfigStore;
use crate::processor::{FsProbe, ProcessorChooser, ProcessorLocator, StepRunner, KNOWN_MODES};
use std::path::{Path, PathBuf};

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let ctx = AppContext::from_env().map_err(|err| err.to_string())?;
    #[cfg(feature = "native-dialogs")]
    let dialogs = crate::app::dialogs::NativeDialogs;
    #[cfg(not(feature = "native-dialogs"))]
    let dialogs = crate::app::dialogs::TerminalDialogs::stdio();
    run_cli_with(&ctx, &dialogs, &args)
}

pub fn run_cli_with<D>(ctx: &AppContext, dialogs: &D, args: &[String]) -> Result<String, String>
where
    D: FileDialogs + ProcessorChooser,
{
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Open => cmd_open(dialogs),
        CliVerb::Run => cmd_run(ctx, dialogs, &args[1..]),
        CliVerb::Locate => cmd_locate(ctx, dialogs, &args[1..]),
        CliVerb::Export => cmd_export(dialogs, &args[1..]),
        CliVerb::Config => cmd_config(ctx),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}

fn locator<'a, D: ProcessorChooser>(ctx: &'a AppContext, dialogs: &'a D) -> ProcessorLocator<'a> {
    ProcessorLocator::new(&ctx.locator, &ctx.store, dialogs, &FsProbe, ctx.log.clone())
}

fn step_runner<'a, D: ProcessorChooser>(ctx: &'a AppContext, dialogs: &'a D) -> StepRunner<'a> {
    StepRunner::new(locator(ctx, dialogs), ctx.log.clone())
        .with_interpreters(ctx.interpreters.clone())
        .with_temp_dir(ctx.temp_dir.clone())
}

fn cmd_open(dialogs: &dyn FileDialogs) -> Result<String, String> {
    let mut session = Session::new();
    match session.open(dialogs).map_err(|err| err.to_string())? {
        OpenOutcome::Canceled => Ok("canceled".to_string()),
        OpenOutcome::Opened { path, content } => Ok(format!("{}\n{content}", path.display())),
    }
}

fn cmd_run<D>(ctx: &AppContext, dialogs: &D, args: &[String]) -> Result<String, String>
where
    D: FileDialogs + ProcessorChooser,
{
    let usage = "usage: run <mode> <input> [--save]";
    let (mode, input) = match args {
        [mode, input, ..] => (mode.as_str(), PathBuf::from(input)),
        _ => return Err(usage.to_string()),
    };
    let save = match &args[2..] {
        [] => false,
        [flag] if flag == "--save" => true,
        _ => return Err(usage.to_string()),
    };
    if !KNOWN_MODES.contains(&mode) {
        return Err(format!(
            "mode must be one of: {}",
            KNOWN_MODES.join(", ")
        ));
    }

    let mut session = Session::new();
    session.set_input(input);
    let runner = step_runner(ctx, dialogs);
    let content = session
        .run(&runner, mode)
        .map_err(|err| err.to_string())?
        .to_string();
    if !save {
        return Ok(content);
    }

    match session.export(dialogs).map_err(|err| err.to_string())? {
        SaveOutcome::Canceled => Ok(format!("{content}\nexport canceled")),
        SaveOutcome::Saved { path } => Ok(format!("{content}\nexported to {}", path.display())),
    }
}

fn cmd_locate<D: ProcessorChooser>(
    ctx: &AppContext,
    dialogs: &D,
    args: &[String],
) -> Result<String, String> {
    let input = args.first().map(Path::new);
    let resolved = locator(ctx, dialogs)
        .resolve(input)
        .map_err(|err| err.to_string())?;
    Ok(format!("kind={}\npath={}", resolved.kind, resolved.path.display()))
}

fn cmd_export(dialogs: &dyn FileDialogs, args: &[String]) -> Result<String, String> {
    let Some(source) = args.first() else {
        return Err("usage: export <file> [<suggested-name>]".to_string());
    };
    let content = read_text(Path::new(source)).map_err(|err| err.to_string())?;
    let suggested = args.get(1).map(String::as_str);
    match save_output(dialogs, &content, suggested).map_err(|err| err.to_string())? {
        SaveOutcome::Canceled => Ok("canceled".to_string()),
        SaveOutcome::Saved { path } => Ok(format!("exported to {}", path.display())),
    }
}

fn cmd_config(ctx: &AppContext) -> Result<String, String> {
    let config = ctx.store.load();
    Ok(format!(
        "config={}\nprocessorPath={}\nlog={}",
        ctx.store.path().display(),
        config.processor_path().unwrap_or("none"),
        ctx.log
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    ))
}
