use std::time::Duration;

use anyhow::Result;
use httpmock::MockServer;
use httpmock::prelude::*;
use opus_admin::{AdminError, AdminSettings, ReloadError, ReloadSettings, ReloadStatus};
use opus_config::{ConfigError, OpusOption, ProfileResource, validate_resource};
use opus_test_support::fixtures::{SAMPLE_STORE, ScratchStore};
use serde_json::json;

async fn reload_endpoint(server: &MockServer, status: u16) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/services")
                .header("content-type", "application/json")
                .json_body(json!({ "asterisk": "reload" }));
            then.status(status);
        })
        .await
}

fn settings(scratch: &ScratchStore, server: &MockServer) -> Result<AdminSettings> {
    let mut reload = ReloadSettings::parse(&format!("{}/services", server.base_url()))?;
    reload.timeout = Duration::from_secs(2);
    Ok(AdminSettings {
        store_path: scratch.path().to_path_buf(),
        reload: Some(reload),
    })
}

#[tokio::test]
async fn full_lifecycle_reloads_after_every_mutation() -> Result<()> {
    let server = MockServer::start_async().await;
    let endpoint = reload_endpoint(&server, 200).await;
    let scratch = ScratchStore::empty()?;
    let service = settings(&scratch, &server)?.build_service()?;

    assert!(service.list().await?.items.is_empty());

    let form = ProfileResource::new("office")
        .with("packet_loss", "10")
        .with("signal", "voice")
        .with("complexity", "");
    let created = service.create(validate_resource(&form)?).await?;
    assert!(matches!(created.reload, ReloadStatus::Reloaded));
    assert_eq!(
        scratch.contents()?,
        "[office]\ntype = opus\nname = office\npacket_loss = 10\nsignal = voice\n\n"
    );

    let updated = service
        .update(ProfileResource::new("office").with("fec", "no"))
        .await?;
    assert!(matches!(updated.reload, ReloadStatus::Reloaded));
    assert_eq!(updated.value.attribute(OpusOption::Fec), Some("no"));

    let listed = service.list().await?;
    assert_eq!(
        serde_json::to_value(&listed)?,
        json!({
            "items": [{
                "id": "office",
                "name": "office",
                "type": "opus",
                "packet_loss": "10",
                "signal": "voice",
                "fec": "no"
            }]
        })
    );

    let deleted = service.delete("office").await?;
    assert!(matches!(deleted.reload, ReloadStatus::Reloaded));
    assert!(service.list().await?.items.is_empty());

    endpoint.assert_hits_async(3).await;
    Ok(())
}

#[tokio::test]
async fn rejected_reload_is_reported_but_change_persists() -> Result<()> {
    let server = MockServer::start_async().await;
    let endpoint = reload_endpoint(&server, 500).await;
    let scratch = ScratchStore::sample()?;
    let service = settings(&scratch, &server)?.build_service()?;

    let outcome = service.delete("music").await?;
    match outcome.reload {
        ReloadStatus::Failed(ReloadError::Status { status, .. }) => {
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected failed reload, got {other:?}"),
    }
    endpoint.assert_async().await;

    let names: Vec<String> = service
        .list()
        .await?
        .items
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["office"]);
    Ok(())
}

#[tokio::test]
async fn store_errors_surface_without_reload() -> Result<()> {
    let server = MockServer::start_async().await;
    let endpoint = reload_endpoint(&server, 200).await;
    let scratch = ScratchStore::sample()?;
    let service = settings(&scratch, &server)?.build_service()?;

    let err = service
        .create(ProfileResource::new("office"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdminError::Config(ConfigError::DuplicateSection { .. })
    ));
    let err = service.get("nonexistent").await.unwrap_err();
    assert!(matches!(err, AdminError::Config(ConfigError::NotFound { .. })));

    endpoint.assert_hits_async(0).await;
    assert_eq!(scratch.contents()?, SAMPLE_STORE);
    Ok(())
}

#[tokio::test]
async fn unreachable_control_plane_is_a_reload_failure() -> Result<()> {
    let scratch = ScratchStore::empty()?;
    let mut reload = ReloadSettings::parse("http://127.0.0.1:9/services")?;
    reload.timeout = Duration::from_secs(2);
    let service = AdminSettings {
        store_path: scratch.path().to_path_buf(),
        reload: Some(reload),
    }
    .build_service()?;

    let outcome = service
        .create(ProfileResource::new("office").with("dtx", "yes"))
        .await?;
    assert!(matches!(
        outcome.reload,
        ReloadStatus::Failed(ReloadError::Transport { .. })
    ));
    assert_eq!(
        service.get("office").await?.attribute(OpusOption::Dtx),
        Some("yes")
    );
    Ok(())
}
