//! Subscriber installation for the administration tools.
//!
//! Events from the opus crates are filtered at the requested level while
//! dependencies (HTTP client, runtime) stay at `warn`. An explicit `RUST_LOG`
//! replaces the computed filter entirely.

use std::io;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt,
};

/// Level applied to the opus crates when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the computed filter.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

const OWN_TARGETS: [&str; 3] = ["opus_admin", "opus_cli", "opus_config"];
const DEPENDENCY_LEVEL: &str = "warn";

/// Selected level and format for the stderr logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level for the opus crates (`error` through `trace`).
    pub level: String,
    /// Line format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::infer(),
        }
    }
}

/// Line format written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty in debug builds, JSON in release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(anyhow!("unknown log format '{other}'")),
        }
    }
}

/// Install the global subscriber writing to stderr.
///
/// Stdout is left to command output.
///
/// # Errors
///
/// Fails when the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match std::env::var(LOG_FILTER_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_FILTER_ENV} value '{directives}'"))?,
        _ => level_filter(&config.level)?,
    };

    let output = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
            .boxed(),
    };

    registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Filter that applies `level` to the opus crates and `warn` elsewhere.
///
/// # Errors
///
/// Fails when `level` does not parse as a level.
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    let level = level.trim();
    if level.parse::<tracing::Level>().is_err() {
        return Err(anyhow!("invalid log level '{level}'"));
    }
    EnvFilter::try_new(filter_directives(level))
        .with_context(|| format!("invalid log level '{level}'"))
}

fn filter_directives(level: &str) -> String {
    OWN_TARGETS
        .iter()
        .fold(DEPENDENCY_LEVEL.to_string(), |mut acc, target| {
            acc.push_str(&format!(",{target}={level}"));
            acc
        })
}
