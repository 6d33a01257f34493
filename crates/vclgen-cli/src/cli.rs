//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{Instrument, info_span};
use uuid::Uuid;
use vclgen_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};

use crate::commands::generate::handle_generate;
use crate::commands::variables::handle_variables;
use crate::context::CliResult;

/// Commit identifier stamped in at build time through `VCLGEN_BUILD_SHA`.
const BUILD_SHA: &str = match option_env!("VCLGEN_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Parses CLI arguments, installs logging, and executes the requested
/// command. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: BUILD_SHA,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn execute(cli: Cli) -> CliResult<()> {
    let trace_id = Uuid::new_v4();
    let span = info_span!(
        "vclgen.command",
        trace_id = %trace_id,
        build_sha = %build_sha(),
        command = command_label(&cli.command)
    );
    dispatch(cli.command).instrument(span).await
}

async fn dispatch(command: Command) -> CliResult<()> {
    match command {
        Command::Generate(args) => handle_generate(args).await,
        Command::Variables(args) => handle_variables(args).await,
    }
}

#[derive(Parser)]
#[command(name = "vclgen", about = "Generate Varnish VCL from storefront cache settings")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "VCLGEN_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter used when RUST_LOG is unset"
    )]
    log_level: String,
    #[arg(long, global = true, value_enum, help = "Log output format")]
    log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render a base template into VCL.
    Generate(GenerateArgs),
    /// Print the resolved template variables.
    Variables(VariablesArgs),
}

#[derive(Args)]
pub(crate) struct SettingsArgs {
    #[arg(long, env = "VCLGEN_SETTINGS", help = "Path to the settings JSON document")]
    pub(crate) settings: PathBuf,
    #[arg(long, help = "Store code whose scoped settings apply")]
    pub(crate) store: Option<String>,
}

#[derive(Args)]
pub(crate) struct GenerateArgs {
    #[command(flatten)]
    pub(crate) source: SettingsArgs,
    #[arg(
        long,
        env = "VCLGEN_TEMPLATE_DIR",
        help = "Directory holding varnish<version>.vcl templates"
    )]
    pub(crate) template_dir: PathBuf,
    #[arg(long, default_value_t = 6)]
    pub(crate) varnish_version: u8,
    #[arg(long, help = "Template file to render instead of the versioned one")]
    pub(crate) input_file: Option<PathBuf>,
    #[arg(long, help = "Write VCL to this file instead of stdout")]
    pub(crate) output: Option<PathBuf>,
    #[arg(long, help = "Use VCL long strings for rule text containing quotes")]
    pub(crate) escape_strings: bool,
    #[arg(long, help = "Open the design exception chain with the first emitted rule")]
    pub(crate) repair_branch_chain: bool,
}

#[derive(Args)]
pub(crate) struct VariablesArgs {
    #[command(flatten)]
    pub(crate) source: SettingsArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Generate(_) => "generate",
        Command::Variables(_) => "variables",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use vclgen_test_support::fixtures::{SAMPLE_SETTINGS, VARNISH6_TEMPLATE, template_dir};

    #[test]
    fn generate_arguments_parse_with_defaults() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "vclgen",
            "generate",
            "--settings",
            "settings.json",
            "--template-dir",
            "templates",
        ])?;
        assert_eq!(cli.log_level, DEFAULT_LOG_LEVEL);
        assert!(cli.log_format.is_none());
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.varnish_version, 6);
                assert_eq!(args.source.settings, PathBuf::from("settings.json"));
                assert!(args.source.store.is_none());
                assert!(args.output.is_none());
                assert!(!args.escape_strings);
                assert!(!args.repair_branch_chain);
            }
            Command::Variables(_) => panic!("expected generate"),
        }
        Ok(())
    }

    #[test]
    fn variables_arguments_accept_format_and_store() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "vclgen",
            "--log-format",
            "json",
            "variables",
            "--settings",
            "settings.json",
            "--store",
            "nl",
            "--format",
            "json",
        ])?;
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        match cli.command {
            Command::Variables(args) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.source.store.as_deref(), Some("nl"));
            }
            Command::Generate(_) => panic!("expected variables"),
        }
        Ok(())
    }

    #[test]
    fn settings_path_is_required() {
        assert!(Cli::try_parse_from(["vclgen", "variables"]).is_err());
    }

    #[test]
    fn log_format_argument_maps_to_telemetry_format() {
        assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
        assert_eq!(LogFormat::from(LogFormatArg::Pretty), LogFormat::Pretty);
    }

    #[test]
    fn build_sha_falls_back_to_dev() {
        assert_eq!(BUILD_SHA, option_env!("VCLGEN_BUILD_SHA").unwrap_or("dev"));
        assert!(!BUILD_SHA.is_empty());
    }

    #[test]
    fn command_label_matches_variants() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["vclgen", "variables", "--settings", "s.json"])?;
        assert_eq!(command_label(&cli.command), "variables");
        Ok(())
    }

    #[tokio::test]
    async fn execute_writes_generated_vcl() -> anyhow::Result<()> {
        let dir = template_dir(6, VARNISH6_TEMPLATE)?;
        let settings = dir.path().join("settings.json");
        let output = dir.path().join("default.vcl");
        std::fs::write(&settings, SAMPLE_SETTINGS)?;

        let args: Vec<OsString> = vec![
            "vclgen".into(),
            "generate".into(),
            "--settings".into(),
            settings.into_os_string(),
            "--template-dir".into(),
            dir.path().as_os_str().to_owned(),
            "--output".into(),
            output.clone().into_os_string(),
        ];
        let cli = Cli::try_parse_from(args)?;
        execute(cli)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        let vcl = std::fs::read_to_string(&output)?;
        assert!(vcl.contains(".host = \"web\";"));
        Ok(())
    }
}
