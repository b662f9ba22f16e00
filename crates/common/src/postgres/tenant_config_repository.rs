use crate::domain::{
    DomainError, DomainResult, FdsEndpoint, TenantConfig, TenantConfigRepository,
    DEFAULT_INACTIVITY_THRESHOLD_SECS,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tokio_postgres::Row;
use tracing::{debug, warn};

/// Row of `fds.config`
#[derive(Debug, Clone)]
pub struct TenantConfigRow {
    pub app_id: i64,
    pub config: serde_json::Value,
    pub enable: bool,
    pub active: bool,
    pub description: Option<String>,
    pub interval_sec: i32,
    pub auth_timeout: i32,
    pub request_timeout: i32,
    pub inactive_timeout: Option<i32>,
    pub proj_ids: Vec<String>,
}

impl From<&Row> for TenantConfigRow {
    fn from(row: &Row) -> Self {
        Self {
            app_id: row.get("app_id"),
            config: row.get("config"),
            enable: row.get("enable"),
            active: row.get("active"),
            description: row.get("description"),
            interval_sec: row.get("interval_sec"),
            auth_timeout: row.get("auth_timeout"),
            request_timeout: row.get("request_timeout"),
            inactive_timeout: row.get("inactive_timeout"),
            proj_ids: row.get("proj_ids"),
        }
    }
}

fn seconds(value: i32) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl TryFrom<TenantConfigRow> for TenantConfig {
    type Error = DomainError;

    fn try_from(row: TenantConfigRow) -> Result<Self, Self::Error> {
        let endpoint: FdsEndpoint = serde_json::from_value(row.config).map_err(|e| {
            DomainError::RepositoryError(anyhow::anyhow!(
                "invalid endpoint document for config {}: {}",
                row.app_id,
                e
            ))
        })?;

        Ok(TenantConfig {
            tenant_id: row.app_id,
            description: row.description,
            endpoint,
            enabled: row.enable,
            active: row.active,
            interval_secs: seconds(row.interval_sec),
            auth_timeout_secs: seconds(row.auth_timeout),
            request_timeout_secs: seconds(row.request_timeout),
            inactivity_threshold_secs: row
                .inactive_timeout
                .map(i64::from)
                .unwrap_or(DEFAULT_INACTIVITY_THRESHOLD_SECS),
            project_ids: row.proj_ids,
        })
    }
}

/// Convert rows, skipping the ones that cannot be read so one broken
/// configuration does not hide the others.
pub fn usable_configs(rows: impl IntoIterator<Item = TenantConfigRow>) -> Vec<TenantConfig> {
    rows.into_iter()
        .filter_map(|row| {
            let app_id = row.app_id;
            match TenantConfig::try_from(row) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(tenant_id = app_id, error = %e, "skipping unreadable configuration");
                    None
                }
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct PostgresTenantConfigRepository {
    client: PostgresClient,
}

impl PostgresTenantConfigRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TenantConfigRepository for PostgresTenantConfigRepository {
    async fn list_configs(&self) -> DomainResult<Vec<TenantConfig>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT app_id, config, enable, active, description, interval_sec, auth_timeout,
                        request_timeout, inactive_timeout, proj_ids
                 FROM fds.config
                 ORDER BY app_id",
                &[],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let configs = usable_configs(rows.iter().map(TenantConfigRow::from));

        debug!(count = configs.len(), "Listed tenant configurations");
        Ok(configs)
    }

    async fn set_active(&self, tenant_id: i64, active: bool) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let updated = conn
            .execute(
                "UPDATE fds.config SET active = $2 WHERE app_id = $1",
                &[&tenant_id, &active],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        debug!(tenant_id, active, updated, "Updated tenant active state");
        Ok(())
    }

    async fn set_all_inactive(&self) -> DomainResult<u64> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let updated = conn
            .execute("UPDATE fds.config SET active = FALSE", &[])
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(updated)
    }
}
