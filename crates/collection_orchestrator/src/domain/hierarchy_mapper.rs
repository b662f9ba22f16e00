use crate::domain::{
    container_input_payload, container_status_payload, device_info_payload, parse_timestamp,
    station_input_payload,
};
use chrono::{DateTime, Utc};
use common::domain::{
    AssetMapping, AssetMappingRepository, AssetSink, DeviceDiagnostics, DeviceNode, DeviceStatus,
    DomainError, DomainResult, NewAsset, TelemetryRecord, TelemetrySubtype, TenantConfig,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Maps the remote device hierarchy onto downstream assets and telemetry.
///
/// Every step is repeated for each downstream project of the tenant.
pub struct HierarchyMapper {
    asset_mappings: Arc<dyn AssetMappingRepository>,
    asset_sink: Arc<dyn AssetSink>,
}

impl HierarchyMapper {
    pub fn new(
        asset_mappings: Arc<dyn AssetMappingRepository>,
        asset_sink: Arc<dyn AssetSink>,
    ) -> Self {
        Self {
            asset_mappings,
            asset_sink,
        }
    }

    /// Make sure the root and its components have assets in every project.
    ///
    /// Components are created with the root's asset as parent.
    pub async fn ensure_assets(&self, tenant: &TenantConfig, root: &DeviceNode) -> DomainResult<()> {
        for project_id in &tenant.project_ids {
            let root_asset_id = self.resolve_asset(tenant, project_id, root, None).await?;
            for component in root.components() {
                self.resolve_asset(tenant, project_id, component, Some(root_asset_id))
                    .await?;
            }
        }
        Ok(())
    }

    /// Look up the asset of a device, creating it downstream on first sight
    pub async fn resolve_asset(
        &self,
        tenant: &TenantConfig,
        project_id: &str,
        node: &DeviceNode,
        parent_asset_id: Option<i32>,
    ) -> DomainResult<i32> {
        let device_id = node.device_id();
        if let Some(asset_id) = self
            .asset_mappings
            .get_asset_id(tenant.tenant_id, project_id, device_id)
            .await?
        {
            return Ok(asset_id);
        }

        let spec = node.spec();
        debug!(
            tenant_id = tenant.tenant_id,
            project_id,
            device_id,
            "creating asset for new device"
        );

        let asset_id = self
            .asset_sink
            .upsert_asset(NewAsset {
                project_id: project_id.to_string(),
                device_id: device_id.to_string(),
                global_asset_identifier: spec.generic.device_serial.clone(),
                name: spec.asset_name(),
                asset_type: node.kind().asset_type().to_string(),
                description: spec.asset_description(),
                parent_asset_id,
            })
            .await?
            .ok_or_else(|| DomainError::MissingAssetId {
                project_id: project_id.to_string(),
                device_id: device_id.to_string(),
            })?;

        self.asset_mappings
            .insert_asset_mapping(AssetMapping {
                tenant_id: tenant.tenant_id,
                project_id: project_id.to_string(),
                device_id: device_id.to_string(),
                asset_id,
            })
            .await?;

        info!(
            tenant_id = tenant.tenant_id,
            project_id,
            device_id,
            asset_id,
            "asset created"
        );
        Ok(asset_id)
    }

    /// Info records (registration date, volume) for the root and its components
    pub async fn emit_device_info(
        &self,
        tenant: &TenantConfig,
        root: &DeviceNode,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        for project_id in &tenant.project_ids {
            for node in std::iter::once(root).chain(root.components()) {
                let spec = node.spec();
                let asset_id = self
                    .mapped_asset_id(tenant, project_id, &spec.device_id)
                    .await?;
                self.write(
                    TelemetrySubtype::Info,
                    parse_timestamp(&spec.generic.registration_date, now),
                    asset_id,
                    &spec.device_id,
                    &device_info_payload(spec),
                )
                .await?;
            }
        }
        Ok(())
    }

    pub async fn emit_station_telemetry(
        &self,
        tenant: &TenantConfig,
        status: &DeviceStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let timestamp = parse_timestamp(&status.generic.last_contact, now);
        let payload = station_input_payload(status, now, tenant.inactivity_threshold_secs);

        for project_id in &tenant.project_ids {
            let asset_id = self
                .mapped_asset_id(tenant, project_id, &status.device_id)
                .await?;
            self.write(
                TelemetrySubtype::Input,
                timestamp,
                asset_id,
                &status.device_id,
                &payload,
            )
            .await?;
        }
        Ok(())
    }

    /// Input record plus the status record with the expected fill level
    pub async fn emit_container_telemetry(
        &self,
        tenant: &TenantConfig,
        status: &DeviceStatus,
        diagnostics: &DeviceDiagnostics,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let timestamp = parse_timestamp(&status.generic.last_contact, now);
        let input =
            container_input_payload(status, diagnostics, now, tenant.inactivity_threshold_secs);
        let expected = container_status_payload(diagnostics);

        for project_id in &tenant.project_ids {
            let asset_id = self
                .mapped_asset_id(tenant, project_id, &status.device_id)
                .await?;
            self.write(
                TelemetrySubtype::Input,
                timestamp,
                asset_id,
                &status.device_id,
                &input,
            )
            .await?;
            self.write(
                TelemetrySubtype::Status,
                timestamp,
                asset_id,
                &status.device_id,
                &expected,
            )
            .await?;
        }
        Ok(())
    }

    async fn mapped_asset_id(
        &self,
        tenant: &TenantConfig,
        project_id: &str,
        device_id: &str,
    ) -> DomainResult<i32> {
        self.asset_mappings
            .get_asset_id(tenant.tenant_id, project_id, device_id)
            .await?
            .ok_or_else(|| DomainError::UnmappedDevice {
                tenant_id: tenant.tenant_id,
                project_id: project_id.to_string(),
                device_id: device_id.to_string(),
            })
    }

    async fn write<P: Serialize>(
        &self,
        subtype: TelemetrySubtype,
        timestamp: DateTime<Utc>,
        asset_id: i32,
        device_id: &str,
        payload: &P,
    ) -> DomainResult<()> {
        let payload = serde_json::to_value(payload).map_err(|e| DomainError::Telemetry {
            asset_id,
            device_id: device_id.to_string(),
            reason: e.to_string(),
        })?;

        debug!(asset_id, device_id, subtype = subtype.as_str(), "writing telemetry");
        self.asset_sink
            .upsert_telemetry(TelemetryRecord {
                subtype,
                timestamp,
                asset_id,
                device_id: device_id.to_string(),
                payload,
            })
            .await
    }
}
