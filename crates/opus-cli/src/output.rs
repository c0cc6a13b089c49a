//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use opus_admin::{ReloadError, ReloadStatus};
use opus_config::{Profile, ProfileList};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

pub(crate) fn format_profile_list(list: &ProfileList, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(list),
        OutputFormat::Table => {
            let width = list
                .items
                .iter()
                .map(|profile| profile.name.chars().count())
                .max()
                .unwrap_or(0)
                .max("NAME".len());
            let mut out = format!("{:<width$}  {:<6} OPTIONS\n", "NAME", "TYPE");
            for profile in &list.items {
                out.push_str(&format!(
                    "{:<width$}  {:<6} {}\n",
                    profile.name,
                    profile.codec,
                    summarize_options(profile)
                ));
            }
            Ok(out)
        }
    }
}

pub(crate) fn format_profile(profile: &Profile, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(profile),
        OutputFormat::Table => {
            let mut out = format!("name: {}\ntype: {}\n", profile.name, profile.codec);
            for (option, value) in &profile.attributes {
                out.push_str(&format!("{option}: {value}\n"));
            }
            for (key, value) in &profile.extra {
                out.push_str(&format!("{key}: {value}\n"));
            }
            Ok(out)
        }
    }
}

/// Warning line for a reload that did not go through; `None` otherwise.
pub(crate) fn reload_warning(status: &ReloadStatus) -> Option<String> {
    let ReloadStatus::Failed(err) = status else {
        return None;
    };
    let detail = match err {
        ReloadError::Status {
            endpoint,
            subsystem,
            status,
        } => format!("{endpoint} answered {status} for {subsystem}"),
        ReloadError::Transport {
            endpoint,
            subsystem,
            ..
        } if err.is_timeout() => format!("{endpoint} timed out reloading {subsystem}"),
        ReloadError::Transport {
            endpoint,
            subsystem,
            ..
        } => format!("{endpoint} unreachable while reloading {subsystem}"),
        other => format!("{other}"),
    };
    Some(format!(
        "change saved, but the service reload failed ({detail}); \
         the running service may use the previous configuration"
    ))
}

fn summarize_options(profile: &Profile) -> String {
    if profile.attributes.is_empty() {
        return "-".to_string();
    }
    profile
        .attributes
        .iter()
        .map(|(option, value)| format!("{option}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map(|text| text + "\n")
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opus_config::OpusOption;
    use reqwest::StatusCode;
    use std::collections::BTreeMap;

    fn profile(name: &str, attributes: &[(OpusOption, &str)]) -> Profile {
        Profile {
            id: name.to_string(),
            name: name.to_string(),
            codec: "opus".to_string(),
            attributes: attributes
                .iter()
                .map(|(option, value)| (*option, (*value).to_string()))
                .collect(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn table_lists_profiles_with_options() {
        let list = ProfileList::from(vec![
            profile("office", &[(OpusOption::PacketLoss, "10"), (OpusOption::Signal, "voice")]),
            profile("bare", &[]),
        ]);
        let text = format_profile_list(&list, OutputFormat::Table).expect("table renders");
        assert_eq!(
            text,
            "NAME    TYPE   OPTIONS\n\
             office  opus   packet_loss=10 signal=voice\n\
             bare    opus   -\n"
        );
    }

    #[test]
    fn json_list_uses_items_envelope() {
        let list = ProfileList::from(vec![profile("office", &[(OpusOption::Fec, "yes")])]);
        let text = format_profile_list(&list, OutputFormat::Json).expect("json renders");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["items"][0]["fec"], "yes");
        assert_eq!(value["items"][0]["type"], "opus");
    }

    #[test]
    fn single_profile_table_lists_each_option() {
        let text = format_profile(
            &profile("office", &[(OpusOption::Bitrate, "24000")]),
            OutputFormat::Table,
        )
        .expect("table renders");
        assert_eq!(text, "name: office\ntype: opus\nbitrate: 24000\n");
    }

    #[test]
    fn reload_warning_only_for_failures() {
        assert!(reload_warning(&ReloadStatus::Reloaded).is_none());
        assert!(reload_warning(&ReloadStatus::Skipped).is_none());

        let failed = ReloadStatus::Failed(ReloadError::Status {
            endpoint: "http://localhost:8668/services".into(),
            subsystem: "asterisk".into(),
            status: StatusCode::BAD_GATEWAY,
        });
        let warning = reload_warning(&failed).expect("warning expected");
        assert!(warning.contains("502 Bad Gateway"));
        assert!(warning.contains("asterisk"));
    }
}
