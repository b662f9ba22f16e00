#![cfg(feature = "integration-tests")]

use common::domain::{AssetMapping, AssetMappingRepository, TenantConfigRepository};
use common::postgres::{
    MigrationRunner, PostgresAssetMappingRepository, PostgresClient, PostgresConfig,
    PostgresTenantConfigRepository,
};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

async fn setup_test_db() -> (ContainerAsync<Postgres>, PostgresClient) {
    let postgres = Postgres::default().start().await.unwrap();
    let host = postgres.get_host().await.unwrap();
    let port = postgres.get_host_port_ipv4(5432).await.unwrap();

    let config = PostgresConfig {
        host: host.to_string(),
        port,
        database: "postgres".to_string(),
        username: "postgres".to_string(),
        password: "postgres".to_string(),
        max_pool_size: 5,
        migrations_dir: format!("{}/migrations/postgres", env!("CARGO_MANIFEST_DIR")),
        goose_binary_path: which::which("goose")
            .expect("goose binary not found")
            .to_string_lossy()
            .to_string(),
    };

    MigrationRunner::new(
        config.goose_binary_path.clone(),
        config.migrations_dir.clone(),
        config.dsn(),
    )
    .run_migrations()
    .await
    .expect("Migrations failed");

    let client = PostgresClient::new(&config).expect("Failed to create client");
    (postgres, client)
}

async fn insert_config(client: &PostgresClient, enable: bool, proj_ids: &[&str]) -> i64 {
    let conn = client.get_connection().await.unwrap();
    let endpoint = serde_json::json!({
        "username": "user",
        "password": "secret",
        "fds_server": "https://fds.example.com/hailo/v1",
        "auth_server": "https://auth.example.com"
    });
    let proj_ids: Vec<String> = proj_ids.iter().map(|p| p.to_string()).collect();
    let row = conn
        .query_one(
            "INSERT INTO fds.config (config, enable, interval_sec, proj_ids)
             VALUES ($1, $2, 30, $3) RETURNING app_id",
            &[&endpoint, &enable, &proj_ids],
        )
        .await
        .unwrap();
    row.get("app_id")
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_fresh_install_seeds_disabled_demo_config() {
    let (_container, client) = setup_test_db().await;
    let repo = PostgresTenantConfigRepository::new(client);

    let configs = repo.list_configs().await.unwrap();

    assert_eq!(configs.len(), 1);
    assert!(!configs[0].enabled);
    assert!(!configs[0].active);
    assert_eq!(configs[0].inactivity_threshold_secs, 43_200);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_active_state_transitions() {
    let (_container, client) = setup_test_db().await;
    let tenant_id = insert_config(&client, true, &["7"]).await;
    let repo = PostgresTenantConfigRepository::new(client);

    repo.set_active(tenant_id, true).await.unwrap();
    let config = repo
        .list_configs()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.tenant_id == tenant_id)
        .unwrap();
    assert!(config.active);
    assert_eq!(config.interval_secs, 30);
    assert_eq!(config.inactivity_threshold_secs, 86_400);
    assert_eq!(config.project_ids, vec!["7"]);

    let updated = repo.set_all_inactive().await.unwrap();
    assert_eq!(updated, 2);
    assert!(repo.list_configs().await.unwrap().iter().all(|c| !c.active));
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_asset_mapping_insert_never_updates() {
    let (_container, client) = setup_test_db().await;
    let tenant_id = insert_config(&client, true, &["7"]).await;
    let repo = PostgresAssetMappingRepository::new(client);

    assert_eq!(repo.get_asset_id(tenant_id, "7", "bin-1").await.unwrap(), None);

    repo.insert_asset_mapping(AssetMapping {
        tenant_id,
        project_id: "7".to_string(),
        device_id: "bin-1".to_string(),
        asset_id: 101,
    })
    .await
    .unwrap();
    repo.insert_asset_mapping(AssetMapping {
        tenant_id,
        project_id: "7".to_string(),
        device_id: "bin-1".to_string(),
        asset_id: 202,
    })
    .await
    .unwrap();

    assert_eq!(
        repo.get_asset_id(tenant_id, "7", "bin-1").await.unwrap(),
        Some(101)
    );
    assert_eq!(repo.get_asset_id(tenant_id, "8", "bin-1").await.unwrap(), None);
}
