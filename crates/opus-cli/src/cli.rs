//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use opus_admin::settings::{DEFAULT_RELOAD_URL, DEFAULT_SUBSYSTEM};
use opus_admin::{AdminSettings, ReloadSettings};
use opus_config::{DEFAULT_STORE_PATH, OpusOption, ProfileResource};
use opus_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::debug;
use url::Url;

use crate::commands::profiles::{
    handle_profile_create, handle_profile_delete, handle_profile_get, handle_profile_list,
    handle_profile_update,
};
use crate::context::{AppContext, CliError, CliResult};

const DEFAULT_RELOAD_TIMEOUT_SECS: u64 = 5;

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli) -> CliResult<()> {
    let settings = cli.settings()?;
    debug!(
        store = %settings.store_path.display(),
        reload = settings.reload.is_some(),
        "resolved administration settings"
    );
    let service = settings.build_service().map_err(CliError::failure)?;
    let ctx = AppContext { service };

    match cli.command {
        Command::Ls => handle_profile_list(&ctx, cli.output).await,
        Command::Get(args) => handle_profile_get(&ctx, &args.name, cli.output).await,
        Command::Create(args) => {
            handle_profile_create(&ctx, &args.into_resource(), cli.output).await
        }
        Command::Update(args) => {
            handle_profile_update(&ctx, &args.into_resource(), cli.output).await
        }
        Command::Delete(args) => handle_profile_delete(&ctx, &args.name).await,
    }
}

#[derive(Parser)]
#[command(name = "opus-admin", about = "Manage Opus codec profiles for the telephony server")]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "OPUS_ADMIN_STORE", default_value = DEFAULT_STORE_PATH)]
    pub(crate) store: PathBuf,
    #[arg(
        long,
        global = true,
        env = "OPUS_ADMIN_RELOAD_URL",
        value_parser = parse_url,
        default_value = DEFAULT_RELOAD_URL
    )]
    pub(crate) reload_url: Url,
    #[arg(
        long,
        global = true,
        env = "OPUS_ADMIN_RELOAD_TIMEOUT_SECS",
        default_value_t = DEFAULT_RELOAD_TIMEOUT_SECS
    )]
    pub(crate) reload_timeout: u64,
    #[arg(
        long = "subsystem",
        global = true,
        env = "OPUS_ADMIN_RELOAD_SUBSYSTEMS",
        value_delimiter = ',',
        default_value = DEFAULT_SUBSYSTEM
    )]
    pub(crate) subsystems: Vec<String>,
    #[arg(long, global = true)]
    pub(crate) no_reload: bool,
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn settings(&self) -> CliResult<AdminSettings> {
        if self.reload_timeout == 0 {
            return Err(CliError::validation("--reload-timeout must be at least 1 second"));
        }
        let reload = if self.no_reload {
            None
        } else {
            let subsystems: Vec<String> = self
                .subsystems
                .iter()
                .map(|subsystem| subsystem.trim().to_string())
                .filter(|subsystem| !subsystem.is_empty())
                .collect();
            if subsystems.is_empty() {
                return Err(CliError::validation(
                    "at least one --subsystem is required unless --no-reload is set",
                ));
            }
            Some(ReloadSettings {
                endpoint: self.reload_url.clone(),
                subsystems,
                timeout: Duration::from_secs(self.reload_timeout),
            })
        };
        Ok(AdminSettings {
            store_path: self.store.clone(),
            reload,
        })
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List all profiles.
    Ls,
    /// Show one profile.
    Get(NameArgs),
    /// Create a profile.
    Create(ProfileArgs),
    /// Update options of an existing profile.
    Update(ProfileArgs),
    /// Delete a profile.
    Delete(NameArgs),
}

#[derive(Args)]
pub(crate) struct NameArgs {
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct ProfileArgs {
    pub(crate) name: String,
    /// Expected packet loss percentage (0-100).
    #[arg(long)]
    pub(crate) packet_loss: Option<String>,
    /// Encoder complexity (0-10).
    #[arg(long)]
    pub(crate) complexity: Option<String>,
    /// Signal type: auto, voice, or music.
    #[arg(long)]
    pub(crate) signal: Option<String>,
    /// Application: `voip`, `audio`, or `low_delay`.
    #[arg(long)]
    pub(crate) application: Option<String>,
    /// Maximum playback rate in Hz (8000-48000).
    #[arg(long)]
    pub(crate) max_playback_rate: Option<String>,
    /// Maximum bandwidth: `narrow`, `medium`, `wide`, `super_wide`, or `full`.
    #[arg(long)]
    pub(crate) max_bandwidth: Option<String>,
    /// Bitrate in bits per second (500-512000).
    #[arg(long)]
    pub(crate) bitrate: Option<String>,
    /// Constant bitrate: yes or no.
    #[arg(long)]
    pub(crate) cbr: Option<String>,
    /// Forward error correction: yes or no.
    #[arg(long)]
    pub(crate) fec: Option<String>,
    /// Discontinuous transmission: yes or no.
    #[arg(long)]
    pub(crate) dtx: Option<String>,
}

impl ProfileArgs {
    /// Form submission equivalent of the supplied flags.
    pub(crate) fn into_resource(self) -> ProfileResource {
        let options = [
            (OpusOption::PacketLoss, self.packet_loss),
            (OpusOption::Complexity, self.complexity),
            (OpusOption::Signal, self.signal),
            (OpusOption::Application, self.application),
            (OpusOption::MaxPlaybackRate, self.max_playback_rate),
            (OpusOption::MaxBandwidth, self.max_bandwidth),
            (OpusOption::Bitrate, self.bitrate),
            (OpusOption::Cbr, self.cbr),
            (OpusOption::Fec, self.fec),
            (OpusOption::Dtx, self.dtx),
        ];
        let mut resource = ProfileResource::new(self.name);
        for (option, value) in options {
            if let Some(value) = value {
                resource.insert(option.as_str(), value);
            }
        }
        resource
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Parse the reload endpoint provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
