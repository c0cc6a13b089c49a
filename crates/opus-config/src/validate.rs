//! Form constraint table for submitted profiles.
//!
//! The store accepts resources as given; request handlers run
//! [`validate_resource`] first so range and choice violations never reach the
//! file.

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{OpusOption, ProfileResource};

/// Maximum length of a profile name, in characters.
pub const NAME_MAX_LEN: usize = 128;

const SIGNAL_CHOICES: &[&str] = &["auto", "voice", "music"];
const APPLICATION_CHOICES: &[&str] = &["voip", "audio", "low_delay"];
const BANDWIDTH_CHOICES: &[&str] = &["narrow", "medium", "wide", "super_wide", "full"];
const TOGGLE_CHOICES: &[&str] = &["no", "yes"];

/// Accepted values for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Inclusive integer range.
    Range {
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
    /// Fixed set of accepted tokens.
    Choice(&'static [&'static str]),
}

/// Constraint attached to an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionConstraint {
    /// Option being constrained.
    pub option: OpusOption,
    /// Accepted values.
    pub constraint: Constraint,
}

/// One entry per [`OpusOption`], in storage order.
pub const OPTION_CONSTRAINTS: [OptionConstraint; 10] = [
    OptionConstraint {
        option: OpusOption::PacketLoss,
        constraint: Constraint::Range { min: 0, max: 100 },
    },
    OptionConstraint {
        option: OpusOption::Complexity,
        constraint: Constraint::Range { min: 0, max: 10 },
    },
    OptionConstraint {
        option: OpusOption::Signal,
        constraint: Constraint::Choice(SIGNAL_CHOICES),
    },
    OptionConstraint {
        option: OpusOption::Application,
        constraint: Constraint::Choice(APPLICATION_CHOICES),
    },
    OptionConstraint {
        option: OpusOption::MaxPlaybackRate,
        constraint: Constraint::Range {
            min: 8_000,
            max: 48_000,
        },
    },
    OptionConstraint {
        option: OpusOption::MaxBandwidth,
        constraint: Constraint::Choice(BANDWIDTH_CHOICES),
    },
    OptionConstraint {
        option: OpusOption::Bitrate,
        constraint: Constraint::Range {
            min: 500,
            max: 512_000,
        },
    },
    OptionConstraint {
        option: OpusOption::Cbr,
        constraint: Constraint::Choice(TOGGLE_CHOICES),
    },
    OptionConstraint {
        option: OpusOption::Fec,
        constraint: Constraint::Choice(TOGGLE_CHOICES),
    },
    OptionConstraint {
        option: OpusOption::Dtx,
        constraint: Constraint::Choice(TOGGLE_CHOICES),
    },
];

impl OpusOption {
    /// Constraint the form layer applies to this option.
    #[must_use]
    pub const fn constraint(self) -> Constraint {
        OPTION_CONSTRAINTS[self as usize].constraint
    }
}

/// Check a submitted resource against the constraint table.
///
/// Returns a normalised copy: blank or null options are dropped (the form's
/// "Select..." placeholder), numeric strings become numbers, and booleans on
/// toggle options become `yes`/`no`. Keys outside the table pass through.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] for a missing or blank name and
/// [`ConfigError::InvalidField`] for the first violated constraint.
pub fn validate_resource(resource: &ProfileResource) -> ConfigResult<ProfileResource> {
    let name = resource.name()?;
    if name.trim().is_empty() {
        return Err(ConfigError::MissingField { field: "name" });
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(invalid(
            "name",
            Some(name.to_string()),
            "longer than 128 characters",
        ));
    }

    let mut normalised = resource.clone();
    for entry in OPTION_CONSTRAINTS {
        let key = entry.option.as_str();
        let Some(value) = resource.get(key) else {
            continue;
        };
        if is_blank(value) {
            normalised.remove(key);
            continue;
        }
        let accepted = match entry.constraint {
            Constraint::Range { min, max } => check_range(key, value, min, max)?,
            Constraint::Choice(choices) => check_choice(key, value, choices)?,
        };
        normalised.insert(key, accepted);
    }
    Ok(normalised)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn check_range(key: &str, value: &Value, min: i64, max: i64) -> ConfigResult<Value> {
    let number = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(key, Some(value.to_string()), "must be an integer"))?;

    if !(min..=max).contains(&number) {
        return Err(invalid(key, Some(number.to_string()), "out of range"));
    }
    Ok(Value::from(number))
}

fn check_choice(key: &str, value: &Value, choices: &[&str]) -> ConfigResult<Value> {
    let token = match value {
        Value::String(text) => text.trim(),
        Value::Bool(true) if choices == TOGGLE_CHOICES => "yes",
        Value::Bool(false) if choices == TOGGLE_CHOICES => "no",
        _ => return Err(invalid(key, Some(value.to_string()), "must be a string")),
    };
    if !choices.contains(&token) {
        return Err(invalid(key, Some(token.to_string()), "not a valid choice"));
    }
    Ok(Value::String(token.to_string()))
}

fn invalid(field: &str, value: Option<String>, reason: &'static str) -> ConfigError {
    ConfigError::InvalidField {
        field: field.to_string(),
        value,
        reason,
    }
}
