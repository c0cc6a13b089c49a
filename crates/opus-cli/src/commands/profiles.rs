use opus_admin::ReloadStatus;
use opus_config::{ProfileResource, validate_resource};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::context::{AppContext, CliResult};
use crate::output::{format_profile, format_profile_list, reload_warning};

pub(crate) async fn handle_profile_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let list = ctx.service.list().await?;
    print!("{}", format_profile_list(&list, format)?);
    Ok(())
}

pub(crate) async fn handle_profile_get(
    ctx: &AppContext,
    name: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let profile = ctx.service.get(name).await?;
    print!("{}", format_profile(&profile, format)?);
    Ok(())
}

pub(crate) async fn handle_profile_create(
    ctx: &AppContext,
    form: &ProfileResource,
    format: OutputFormat,
) -> CliResult<()> {
    let resource = validate_resource(form)?;
    let outcome = ctx.service.create(resource).await?;
    report_reload(&outcome.reload);
    match format {
        OutputFormat::Table => println!("Profile '{}' created.", outcome.value.name),
        OutputFormat::Json => print!("{}", format_profile(&outcome.value, format)?),
    }
    Ok(())
}

pub(crate) async fn handle_profile_update(
    ctx: &AppContext,
    form: &ProfileResource,
    format: OutputFormat,
) -> CliResult<()> {
    let resource = validate_resource(form)?;
    let outcome = ctx.service.update(resource).await?;
    report_reload(&outcome.reload);
    match format {
        OutputFormat::Table => println!("Profile '{}' updated.", outcome.value.name),
        OutputFormat::Json => print!("{}", format_profile(&outcome.value, format)?),
    }
    Ok(())
}

pub(crate) async fn handle_profile_delete(ctx: &AppContext, name: &str) -> CliResult<()> {
    let outcome = ctx.service.delete(name).await?;
    report_reload(&outcome.reload);
    println!("Profile '{name}' deleted.");
    Ok(())
}

fn report_reload(status: &ReloadStatus) {
    if let Some(warning) = reload_warning(status) {
        eprintln!("warning: {warning}");
        return;
    }
    debug!(skipped = matches!(status, ReloadStatus::Skipped), "reload settled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CliError;
    use anyhow::Result;
    use httpmock::prelude::*;
    use opus_admin::{AdminSettings, ProfileService, ReloadSettings};
    use opus_config::ProfileStore;
    use opus_test_support::fixtures::{SAMPLE_STORE, ScratchStore};
    use serde_json::json;

    fn offline_context(scratch: &ScratchStore) -> AppContext {
        AppContext {
            service: ProfileService::new(ProfileStore::new(scratch.path())),
        }
    }

    #[tokio::test]
    async fn create_validates_before_touching_the_store() -> Result<()> {
        let scratch = ScratchStore::empty()?;
        let ctx = offline_context(&scratch);

        let form = ProfileResource::new("office").with("complexity", "11");
        let err = handle_profile_create(&ctx, &form, OutputFormat::Table)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(err.display_message(), "invalid complexity '11': out of range");
        assert!(!scratch.path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn create_writes_only_supplied_options() -> Result<()> {
        let scratch = ScratchStore::empty()?;
        let ctx = offline_context(&scratch);

        let form = ProfileResource::new("office")
            .with("bitrate", "24000")
            .with("cbr", "");
        handle_profile_create(&ctx, &form, OutputFormat::Json)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert_eq!(
            scratch.contents()?,
            "[office]\ntype = opus\nname = office\nbitrate = 24000\n\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_profile_are_validation_errors() -> Result<()> {
        let scratch = ScratchStore::sample()?;
        let ctx = offline_context(&scratch);

        let err = handle_profile_update(
            &ctx,
            &ProfileResource::new("nonexistent").with("dtx", "yes"),
            OutputFormat::Table,
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = handle_profile_delete(&ctx, "nonexistent").await.unwrap_err();
        assert_eq!(err.display_message(), "profile 'nonexistent' not found");
        assert_eq!(scratch.contents()?, SAMPLE_STORE);
        Ok(())
    }

    #[tokio::test]
    async fn failed_reload_does_not_fail_the_command() -> Result<()> {
        let server = MockServer::start_async().await;
        let endpoint = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/services")
                    .json_body(json!({ "asterisk": "reload" }));
                then.status(503);
            })
            .await;
        let scratch = ScratchStore::sample()?;
        let service = AdminSettings {
            store_path: scratch.path().to_path_buf(),
            reload: Some(ReloadSettings::parse(&format!("{}/services", server.base_url()))?),
        }
        .build_service()?;
        let ctx = AppContext { service };

        handle_profile_delete(&ctx, "music")
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        endpoint.assert_async().await;
        assert!(!scratch.contents()?.contains("[music]"));
        Ok(())
    }
}
