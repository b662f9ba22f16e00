use crate::domain::{AssetMapping, AssetMappingRepository, DomainError, DomainResult};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tracing::debug;

#[derive(Clone)]
pub struct PostgresAssetMappingRepository {
    client: PostgresClient,
}

impl PostgresAssetMappingRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetMappingRepository for PostgresAssetMappingRepository {
    async fn get_asset_id(
        &self,
        tenant_id: i64,
        project_id: &str,
        device_id: &str,
    ) -> DomainResult<Option<i32>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT asset_id FROM fds.asset
                 WHERE config_id = $1 AND proj_id = $2 AND device_id = $3",
                &[&tenant_id, &project_id, &device_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| row.get("asset_id")))
    }

    async fn insert_asset_mapping(&self, mapping: AssetMapping) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let inserted = conn
            .execute(
                "INSERT INTO fds.asset (config_id, proj_id, device_id, asset_id)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (config_id, proj_id, device_id) DO NOTHING",
                &[
                    &mapping.tenant_id,
                    &mapping.project_id,
                    &mapping.device_id,
                    &mapping.asset_id,
                ],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        debug!(
            tenant_id = mapping.tenant_id,
            project_id = %mapping.project_id,
            device_id = %mapping.device_id,
            asset_id = mapping.asset_id,
            inserted,
            "Stored asset mapping"
        );
        Ok(())
    }
}
