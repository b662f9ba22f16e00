#![allow(dead_code)]

use async_trait::async_trait;
use common::domain::{
    AssetMapping, AssetMappingRepository, AssetSink, AssetTypeDefinition, DeviceSpec, DomainResult, FdsEndpoint,
    NewAsset, TelemetryRecord, TenantConfig,
};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

pub fn tenant(tenant_id: i64, project_ids: &[&str]) -> TenantConfig {
    TenantConfig {
        tenant_id,
        enabled: true,
        active: true,
        project_ids: project_ids.iter().map(|p| p.to_string()).collect(),
        ..TenantConfig::ad_hoc(FdsEndpoint::default())
    }
}

pub fn spec(device_id: &str, components: Vec<DeviceSpec>) -> DeviceSpec {
    let mut spec = DeviceSpec {
        device_id: device_id.to_string(),
        ..Default::default()
    };
    spec.generic.model = "Trio".to_string();
    spec.generic.device_serial = format!("SN-{}", device_id);
    spec.generic.registration_date = "2020-05-01T00:00:00.000Z".to_string();
    spec.device_type_specific.bin_volume = 120;
    spec.device_type_specific.component_id_list = components;
    spec
}

/// Asset mapping store backed by a HashMap
#[derive(Default)]
pub struct InMemoryAssetMappings {
    mappings: Mutex<HashMap<(i64, String, String), i32>>,
}

#[async_trait]
impl AssetMappingRepository for InMemoryAssetMappings {
    async fn get_asset_id(
        &self,
        tenant_id: i64,
        project_id: &str,
        device_id: &str,
    ) -> DomainResult<Option<i32>> {
        let mappings = self.mappings.lock().unwrap();
        Ok(mappings
            .get(&(tenant_id, project_id.to_string(), device_id.to_string()))
            .copied())
    }

    async fn insert_asset_mapping(&self, mapping: AssetMapping) -> DomainResult<()> {
        let mut mappings = self.mappings.lock().unwrap();
        mappings
            .entry((mapping.tenant_id, mapping.project_id, mapping.device_id))
            .or_insert(mapping.asset_id);
        Ok(())
    }
}

/// Sink recording everything written, handing out sequential asset ids
#[derive(Default)]
pub struct RecordingSink {
    pub asset_types: Mutex<Vec<AssetTypeDefinition>>,
    pub assets: Mutex<Vec<(i32, NewAsset)>>,
    pub records: Mutex<Vec<TelemetryRecord>>,
}

#[async_trait]
impl AssetSink for RecordingSink {
    async fn upsert_asset_type(&self, asset_type: AssetTypeDefinition) -> DomainResult<()> {
        self.asset_types.lock().unwrap().push(asset_type);
        Ok(())
    }

    async fn upsert_asset(&self, asset: NewAsset) -> DomainResult<Option<i32>> {
        let mut assets = self.assets.lock().unwrap();
        let id = 100 + assets.len() as i32 + 1;
        assets.push((id, asset));
        Ok(Some(id))
    }

    async fn upsert_telemetry(&self, record: TelemetryRecord) -> DomainResult<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// JSON log lines written while the guard returned by `install` is alive
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
