//! Profile records and submitted resources.
//!
//! # Design
//! - `Profile` is what the store hands back: declared Opus options in a typed,
//!   ordered map plus any other keys found in the section.
//! - `ProfileResource` is what callers submit: an untyped mapping, because
//!   `create` and `update` treat present-but-falsy values differently.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{ID_KEY, NAME_KEY, TYPE_KEY};
use crate::error::{ConfigError, ConfigResult};
use crate::ini::IniSection;

/// Tunable Opus encoder options a profile may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpusOption {
    /// Expected packet loss percentage.
    PacketLoss,
    /// Encoder computational complexity.
    Complexity,
    /// Signal type hint (`auto`, `voice`, `music`).
    Signal,
    /// Coding mode (`voip`, `audio`, `low_delay`).
    Application,
    /// Maximum playback sample rate in Hz.
    MaxPlaybackRate,
    /// Maximum audio bandwidth.
    MaxBandwidth,
    /// Target bitrate in bits per second.
    Bitrate,
    /// Constant bitrate toggle.
    Cbr,
    /// In-band forward error correction toggle.
    Fec,
    /// Discontinuous transmission toggle.
    Dtx,
}

impl OpusOption {
    /// Every option, in storage order.
    pub const ALL: [Self; 10] = [
        Self::PacketLoss,
        Self::Complexity,
        Self::Signal,
        Self::Application,
        Self::MaxPlaybackRate,
        Self::MaxBandwidth,
        Self::Bitrate,
        Self::Cbr,
        Self::Fec,
        Self::Dtx,
    ];

    /// Key used for the option in the store and in resources.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PacketLoss => "packet_loss",
            Self::Complexity => "complexity",
            Self::Signal => "signal",
            Self::Application => "application",
            Self::MaxPlaybackRate => "max_playback_rate",
            Self::MaxBandwidth => "max_bandwidth",
            Self::Bitrate => "bitrate",
            Self::Cbr => "cbr",
            Self::Fec => "fec",
            Self::Dtx => "dtx",
        }
    }
}

impl FromStr for OpusOption {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidField {
                field: s.to_string(),
                value: None,
                reason: "unknown option",
            })
    }
}

impl Display for OpusOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored codec profile.
///
/// Serialises to the flat mapping a view layer expects:
/// `{"id", "name", "type", <options...>, <extra...>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// External identifier; always the section name.
    pub id: String,
    /// Profile name; always the section name.
    pub name: String,
    /// Codec family tag read from the `type` key.
    #[serde(rename = "type")]
    pub codec: String,
    /// Declared Opus options present in the section.
    #[serde(flatten)]
    pub attributes: BTreeMap<OpusOption, String>,
    /// Any other keys present in the section.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Profile {
    pub(crate) fn from_section(section: &IniSection) -> Self {
        let mut attributes = BTreeMap::new();
        let mut extra = BTreeMap::new();
        for (key, value) in section.entries() {
            if matches!(key, TYPE_KEY | NAME_KEY | ID_KEY) {
                continue;
            }
            match key.parse::<OpusOption>() {
                Ok(option) => {
                    attributes.insert(option, value.to_string());
                }
                Err(_) => {
                    extra.insert(key.to_string(), value.to_string());
                }
            }
        }

        Self {
            id: section.name().to_string(),
            name: section.name().to_string(),
            codec: section.get(TYPE_KEY).unwrap_or_default().to_string(),
            attributes,
            extra,
        }
    }

    /// Stored value of a declared option.
    #[must_use]
    pub fn attribute(&self, option: OpusOption) -> Option<&str> {
        self.attributes.get(&option).map(String::as_str)
    }
}

/// Listing envelope handed to view layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileList {
    /// Profiles in file order.
    pub items: Vec<Profile>,
}

impl From<Vec<Profile>> for ProfileList {
    fn from(items: Vec<Profile>) -> Self {
        Self { items }
    }
}

/// A submitted profile mapping (a parsed form submission).
///
/// Must carry a string `name`; every other key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileResource(Map<String, Value>);

impl ProfileResource {
    /// Start a resource for the named profile.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(NAME_KEY.to_string(), Value::String(name.into()));
        Self(map)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate over all submitted keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The profile name the resource targets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `name` is absent or null and
    /// [`ConfigError::InvalidField`] when it is not a string.
    pub fn name(&self) -> ConfigResult<&str> {
        match self.0.get(NAME_KEY) {
            None | Some(Value::Null) => Err(ConfigError::MissingField { field: NAME_KEY }),
            Some(Value::String(name)) => Ok(name),
            Some(other) => Err(ConfigError::InvalidField {
                field: NAME_KEY.to_string(),
                value: Some(other.to_string()),
                reason: "must be a string",
            }),
        }
    }
}

impl From<Map<String, Value>> for ProfileResource {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Truthiness used by `create`: null, `""`, zero, `false`, and empty
/// collections count as absent.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Stored text form of a value; `None` for null.
pub(crate) fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn option_parses_and_formats() {
        for option in OpusOption::ALL {
            assert_eq!(option.as_str().parse::<OpusOption>().unwrap(), option);
            assert_eq!(option.to_string(), option.as_str());
        }
        assert!("bandwidth".parse::<OpusOption>().is_err());
    }

    #[test]
    fn truthiness_matches_form_semantics() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("no")));
        assert!(is_truthy(&json!(10)));
        assert!(is_truthy(&json!(true)));
    }

    #[test]
    fn values_render_as_stored_text() {
        assert_eq!(render_value(&Value::Null), None);
        assert_eq!(render_value(&json!(48_000)).as_deref(), Some("48000"));
        assert_eq!(render_value(&json!("voice")).as_deref(), Some("voice"));
        assert_eq!(render_value(&json!(true)).as_deref(), Some("yes"));
        assert_eq!(render_value(&json!(false)).as_deref(), Some("no"));
    }

    #[test]
    fn resource_name_requires_string() {
        assert_eq!(ProfileResource::new("office").name().unwrap(), "office");

        let missing = ProfileResource::default();
        assert!(matches!(
            missing.name(),
            Err(ConfigError::MissingField { field: "name" })
        ));

        let numeric = ProfileResource::default().with("name", 7);
        assert!(matches!(
            numeric.name(),
            Err(ConfigError::InvalidField { reason: "must be a string", .. })
        ));
    }

    #[test]
    fn profile_splits_declared_and_extra_keys() {
        let mut section = IniSection::new("office");
        section.set("type", "opus");
        section.set("name", "stale");
        section.set("signal", "voice");
        section.set("custom", "1");

        let profile = Profile::from_section(&section);
        assert_eq!(profile.id, "office");
        assert_eq!(profile.name, "office");
        assert_eq!(profile.codec, "opus");
        assert_eq!(profile.attribute(OpusOption::Signal), Some("voice"));
        assert_eq!(profile.extra.get("custom").map(String::as_str), Some("1"));

        let view = serde_json::to_value(&profile).expect("profile should serialise");
        assert_eq!(
            view,
            json!({
                "id": "office",
                "name": "office",
                "type": "opus",
                "signal": "voice",
                "custom": "1"
            })
        );
    }
}
