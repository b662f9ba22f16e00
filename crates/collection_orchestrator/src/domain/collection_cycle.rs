use crate::domain::HierarchyMapper;
use chrono::Utc;
use common::domain::{DeviceDataSource, DeviceNode, DomainResult, TenantConfig};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// One pass over a tenant's device hierarchy.
///
/// Steps run strictly in order and the first error ends the cycle; writes
/// committed before the failing step are kept.
pub struct CollectionCycle {
    data_source: Arc<dyn DeviceDataSource>,
    mapper: HierarchyMapper,
}

impl CollectionCycle {
    pub fn new(data_source: Arc<dyn DeviceDataSource>, mapper: HierarchyMapper) -> Self {
        Self {
            data_source,
            mapper,
        }
    }

    /// Run a cycle, logging instead of returning failures
    #[instrument(skip(self, tenant), fields(tenant_id = tenant.tenant_id))]
    pub async fn run(&self, tenant: &TenantConfig) {
        match self.try_run(tenant).await {
            Ok(devices) => info!(devices, "collection cycle finished"),
            Err(e) => error!(error = %e, "collection cycle aborted"),
        }
    }

    /// Run a cycle, returning the number of root devices processed
    pub async fn try_run(&self, tenant: &TenantConfig) -> DomainResult<usize> {
        let specs = self.data_source.get_specs(tenant).await?;
        debug!(count = specs.len(), "received device specifications");

        let mut processed = 0;
        for spec in specs {
            let root = DeviceNode::from_spec(spec);
            if let Err(e) = self.collect_root(tenant, &root).await {
                error!(device_id = %root.device_id(), error = %e, "device collection failed");
                return Err(e);
            }
            processed += 1;
        }

        Ok(processed)
    }

    #[instrument(skip(self, tenant, root), fields(device_id = %root.device_id()))]
    async fn collect_root(&self, tenant: &TenantConfig, root: &DeviceNode) -> DomainResult<()> {
        self.mapper.ensure_assets(tenant, root).await?;
        self.mapper.emit_device_info(tenant, root, Utc::now()).await?;

        let status = self.data_source.get_status(tenant, root.device_id()).await?;

        if status.is_station() {
            self.mapper
                .emit_station_telemetry(tenant, &status, Utc::now())
                .await?;

            for component in &status.device_type_specific.component_statuses {
                let diagnostics = self
                    .data_source
                    .get_diagnostics(tenant, &component.device_id)
                    .await?;
                self.mapper
                    .emit_container_telemetry(tenant, component, &diagnostics, Utc::now())
                    .await?;
            }
        } else {
            let diagnostics = self
                .data_source
                .get_diagnostics(tenant, root.device_id())
                .await?;
            self.mapper
                .emit_container_telemetry(tenant, &status, &diagnostics, Utc::now())
                .await?;
        }

        Ok(())
    }
}
