//! Error types for profile store operations.
//!
//! # Design
//! - Constant messages; the offending section, path, or field travels as
//!   structured context so callers can branch without parsing text.
//! - Source errors are preserved rather than interpolated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for profile store operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No section with the requested name exists in the store.
    #[error("profile section not found")]
    NotFound {
        /// Section name that was looked up.
        section: String,
    },
    /// A section with the requested name already exists.
    #[error("profile section already exists")]
    DuplicateSection {
        /// Section name that collided.
        section: String,
    },
    /// The backing file exists but is not a well-formed section document.
    #[error("profile store is malformed")]
    MalformedStore {
        /// Path of the store file.
        path: PathBuf,
        /// One-based line number where parsing stopped.
        line: usize,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The section name cannot be represented as a section header.
    #[error("invalid section name")]
    InvalidSectionName {
        /// Name supplied by the caller.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A required resource field was missing.
    #[error("missing required field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A resource field contained an invalid value.
    #[error("invalid profile field")]
    InvalidField {
        /// Field that failed validation.
        field: String,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Acquiring the advisory store lock failed.
    #[error("failed to lock profile store")]
    Lock {
        /// Path of the lock file.
        path: PathBuf,
        /// Underlying errno.
        source: nix::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    /// Whether the error reflects caller input (missing, conflicting, or
    /// invalid data) rather than an operational failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::DuplicateSection { .. }
                | Self::InvalidSectionName { .. }
                | Self::MissingField { .. }
                | Self::InvalidField { .. }
        )
    }
}

/// Convenience alias for profile store results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_errors_are_classified() {
        assert!(
            ConfigError::NotFound {
                section: "office".into()
            }
            .is_user_facing()
        );
        assert!(
            ConfigError::DuplicateSection {
                section: "office".into()
            }
            .is_user_facing()
        );
        assert!(
            !ConfigError::MalformedStore {
                path: PathBuf::from("/tmp/opus.conf"),
                line: 1,
                reason: "entry outside of a section",
            }
            .is_user_facing()
        );
        assert!(
            !ConfigError::Io {
                operation: "read_store",
                path: PathBuf::from("/tmp/opus.conf"),
                source: io::Error::other("boom"),
            }
            .is_user_facing()
        );
    }
}
