use closewatch_core::config::{CacheConfig, Config, InventoryConfig, RefreshConfig, RegistryConfig};
use closewatch_core::{ClosureNotifier, HostEvent, PackageId, RowContext};
use tempfile::TempDir;

const CLOSED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
  <div class="entry-content">
    <div id="tab-description" class="plugin-description section">
      <div class="plugin-notice notice notice-error notice-alt"><p>This plugin has been closed as of June 1, 2024 and is not available for download.</p></div>
      <div class="plugin-notice notice notice-info notice-alt"><p> Reason: Security Issue.</p></div>
      <p>Once upon a time this was a fine plugin.</p>
    </div>
  </div>
</body>
</html>"#;

const OPEN_PAGE: &str = r#"<html><body>
  <div id="tab-description"><p>Spam protection for your site.</p></div>
</body></html>"#;

fn write_fixtures(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let installed = dir.path().join("installed.json");
    std::fs::write(
        &installed,
        r#"{
            "akismet/akismet.php": { "name": "Akismet Anti-Spam", "version": "5.3" },
            "abandoned/abandoned.php": { "name": "Abandoned Plugin", "version": "1.0" },
            "broken/broken.php": { "name": "Broken Page" },
            "in-house/in-house.php": { "name": "In House", "update_uri": "https://example.com/in-house" },
            "jetpack/jetpack.php": { "name": "Jetpack" }
        }"#,
    )
    .unwrap();

    let update_status = dir.path().join("update_status.json");
    std::fs::write(&update_status, r#"{ "no_update": ["jetpack/jetpack.php"] }"#).unwrap();

    (installed, update_status)
}

fn config_for(dir: &TempDir, registry_url: String) -> Config {
    let (installed_path, update_status_path) = write_fixtures(dir);

    Config {
        registry: RegistryConfig {
            base_url: registry_url,
            timeout_secs: 5,
            ..RegistryConfig::default()
        },
        refresh: RefreshConfig {
            interval_hours: 12,
            concurrency: 2,
        },
        cache: CacheConfig {
            db_path: Some(dir.path().join("cache.db")),
            ..CacheConfig::default()
        },
        inventory: InventoryConfig {
            installed_path,
            update_status_path,
        },
    }
}

#[tokio::test]
async fn test_full_pipeline_against_mock_registry() {
    let mut server = mockito::Server::new_async().await;
    let closed = server
        .mock("GET", "/plugins/abandoned/")
        .with_status(200)
        .with_body(CLOSED_PAGE)
        .expect(1)
        .create_async()
        .await;
    let open = server
        .mock("GET", "/plugins/akismet/")
        .with_status(200)
        .with_body(OPEN_PAGE)
        .expect(1)
        .create_async()
        .await;
    let broken = server
        .mock("GET", "/plugins/broken/")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let skipped = server
        .mock("GET", "/plugins/in-house/")
        .expect(0)
        .create_async()
        .await;
    let live = server
        .mock("GET", "/plugins/jetpack/")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, server.url());

    let notifier = ClosureNotifier::from_config(&config).unwrap();
    notifier.init();

    let report = notifier.handle(HostEvent::PluginsPageLoad).await.unwrap();
    assert_eq!(report.probed, 3);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.closed, 1);

    // Throttled: no more registry traffic
    assert!(notifier.handle(HostEvent::UpdateCorePageLoad).await.is_none());

    closed.assert_async().await;
    open.assert_async().await;
    broken.assert_async().await;
    skipped.assert_async().await;
    live.assert_async().await;

    let status = notifier.status();
    let id = PackageId::new("abandoned/abandoned.php");
    assert_eq!(status.closed_count(), 1);
    assert_eq!(
        status.notice(&id),
        Some(
            "This plugin has been closed as of June 1, 2024 and is not available for download. Reason: Security Issue."
        )
    );

    let row = notifier
        .row_annotator()
        .render(
            &id,
            &closewatch_core::PackageMetadata::new("Abandoned Plugin"),
            RowContext::default(),
        )
        .unwrap();
    assert!(row.contains("data-slug=\"abandoned\""));
    assert!(notifier.menu_badge().unwrap().contains("count-1"));
}

#[tokio::test]
async fn test_record_survives_restart() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", mockito::Matcher::Regex("^/plugins/.*".to_string()))
        .with_status(200)
        .with_body(CLOSED_PAGE)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, server.url());

    {
        let notifier = ClosureNotifier::from_config(&config).unwrap();
        notifier.init();
        notifier.handle(HostEvent::UpdateCheckCompleted).await.unwrap();
    }

    // New process, same database
    let notifier = ClosureNotifier::from_config(&config).unwrap();
    let status = notifier.status();

    assert_eq!(status.closed_count(), 3);
    assert!(status.last_checked.is_some());
    assert!(!notifier.scheduler().is_due(&status, chrono::Utc::now()));
}
