//! Command-line front end: argument parsing, profile and endpoint
//! resolution, then one interactive wizard run.

pub mod forms;
pub mod output;

use std::path::PathBuf;

use tracing::debug;

use crate::config::ConfigManager;
use crate::errors::CliError;
use crate::profiles::{self, PROFILES};
use crate::submission::HttpTransport;
use crate::utils::build_info;

use self::forms::{FormResult, FormRunner, TerminalInteraction};
use self::output::OutputPreferences;

const USAGE: &str = "\
Usage: w3_intake [PROFILE] [OPTIONS]

Walks through a lead intake form and submits it once.

Options:
  --endpoint <URL>   Submission endpoint (overrides config and W3_INTAKE_ENDPOINT)
  --config <PATH>    Config file to read instead of the default location
  --plain            Disable colored output
  --list-profiles    Show the built-in forms
  --version          Show build information
  -h, --help         Show this message";

/// What the invocation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CliCommand {
    #[default]
    Run,
    ListProfiles,
    Version,
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub command: CliCommand,
    pub profile: Option<String>,
    pub endpoint: Option<String>,
    pub config_path: Option<PathBuf>,
    pub plain: bool,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--endpoint" => parsed.endpoint = Some(value_for(&arg, args.next())?),
                "--config" => parsed.config_path = Some(value_for(&arg, args.next())?.into()),
                "--plain" => parsed.plain = true,
                "--list-profiles" => parsed.command = CliCommand::ListProfiles,
                "--version" | "-V" => parsed.command = CliCommand::Version,
                "--help" | "-h" => parsed.command = CliCommand::Help,
                flag if flag.starts_with('-') => {
                    return Err(CliError::Input(format!("unknown option `{}`", flag)))
                }
                _ if parsed.profile.is_some() => {
                    return Err(CliError::Input(format!("unexpected argument `{}`", arg)))
                }
                _ => parsed.profile = Some(arg),
            }
        }

        Ok(parsed)
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, CliError> {
    value
        .filter(|value| !value.starts_with("--"))
        .ok_or_else(|| CliError::Input(format!("`{}` needs a value", flag)))
}

pub async fn run_cli<I>(args: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = String>,
{
    let args = CliArgs::parse(args)?;
    output::set_preferences(OutputPreferences { plain: args.plain });

    match args.command {
        CliCommand::Help => println!("{USAGE}"),
        CliCommand::Version => println!("{}", build_info::current().summary()),
        CliCommand::ListProfiles => {
            for (name, summary) in PROFILES {
                println!("{:<14} {}", name, summary);
            }
        }
        CliCommand::Run => run_wizard(args).await?,
    }
    Ok(())
}

async fn run_wizard(args: CliArgs) -> Result<(), CliError> {
    let manager = match args.config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_with_env()?;
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = Some(endpoint);
    }

    let profile = profiles::find(&config.profile)?;
    let endpoint = config.resolve_endpoint(&profile)?;
    debug!(profile = profile.name, %endpoint, config = %manager.path().display(), "starting wizard");

    let transport = HttpTransport::new(config.timeout())?.with_headers(config.merged_headers(&profile));
    let client = profile.client(endpoint, transport);
    let mut wizard = profile.wizard();

    output::info(format!("{} ({} sections)", profile.summary, wizard.section_count()));
    match FormRunner::new(&client)
        .run(&mut wizard, &mut TerminalInteraction::new())
        .await
    {
        FormResult::Submitted(_) => {}
        FormResult::Cancelled => output::info("Form cancelled. Nothing was submitted."),
    }
    Ok(())
}
