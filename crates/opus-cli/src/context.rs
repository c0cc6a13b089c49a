//! Shared service context and error types for command handlers.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use opus_admin::{AdminError, ProfileService};
use opus_config::ConfigError;

/// CLI-level error type to distinguish caller mistakes from operational
/// failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        if !error.is_user_facing() {
            return match error {
                ConfigError::MalformedStore { path, line, reason } => Self::failure(anyhow!(
                    "profile store {} is malformed at line {line}: {reason}",
                    path.display()
                )),
                other => Self::failure(other),
            };
        }
        let message = match error {
            ConfigError::NotFound { section } => format!("profile '{section}' not found"),
            ConfigError::DuplicateSection { section } => {
                format!("profile '{section}' already exists")
            }
            ConfigError::InvalidSectionName { value, reason } => {
                format!("invalid profile name '{value}': {reason}")
            }
            ConfigError::MissingField { field } => format!("{field} is required"),
            ConfigError::InvalidField {
                field,
                value: Some(value),
                reason,
            } => format!("invalid {field} '{value}': {reason}"),
            ConfigError::InvalidField {
                field,
                value: None,
                reason,
            } => format!("invalid {field}: {reason}"),
            other => other.to_string(),
        };
        Self::Validation(message)
    }
}

impl From<AdminError> for CliError {
    fn from(error: AdminError) -> Self {
        match error {
            AdminError::Config(config) => config.into(),
            other @ AdminError::Worker { .. } => Self::failure(other),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    pub(crate) service: ProfileService,
}
