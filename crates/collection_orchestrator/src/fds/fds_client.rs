use crate::domain::TokenCache;
use async_trait::async_trait;
use common::domain::{
    DataEnvelope, DeviceDataSource, DeviceDiagnostics, DeviceSpec, DeviceStatus, DomainError,
    DomainResult, TenantConfig,
};
use common::http::JsonHttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

pub const SPECIFICATIONS_PATH: &str = "/specifications";
pub const STATUS_PATH: &str = "/status";
pub const DIAGNOSTICS_PATH: &str = "/diagnostics";

/// Data endpoint URL, optionally filtered to one device
pub fn resource_url(fds_server: &str, path: &str, device_id: Option<&str>) -> String {
    let base = fds_server.trim_end_matches('/');
    match device_id {
        Some(id) => {
            let id: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
            format!("{}{}/?ids={}", base, path, id)
        }
        None => format!("{}{}", base, path),
    }
}

/// Reads device specifications, status and diagnostics from the FDS REST API
pub struct FdsClient {
    http: JsonHttpClient,
    token_cache: Arc<TokenCache>,
}

impl FdsClient {
    pub fn new(http: JsonHttpClient, token_cache: Arc<TokenCache>) -> Self {
        Self { http, token_cache }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        tenant: &TenantConfig,
        path: &str,
        device_id: Option<&str>,
    ) -> DomainResult<DataEnvelope<T>> {
        let token = self.token_cache.get_token(tenant).await?;
        let authorization = format!("Bearer {}", token.as_str());
        let url = resource_url(&tenant.endpoint.fds_server, path, device_id);

        debug!(tenant_id = tenant.tenant_id, %url, "reading remote resource");
        self.http
            .get_json(
                &url,
                &[("authorization", authorization.as_str())],
                tenant.request_timeout(),
            )
            .await
            .map_err(|e| DomainError::RemoteRead {
                tenant_id: tenant.tenant_id,
                resource: describe(path, device_id),
                reason: e.to_string(),
            })
    }

    async fn fetch_single<T: DeserializeOwned>(
        &self,
        tenant: &TenantConfig,
        path: &str,
        device_id: &str,
    ) -> DomainResult<T> {
        let envelope = self.fetch(tenant, path, Some(device_id)).await?;
        single_element(envelope, tenant.tenant_id, path, device_id)
    }
}

fn describe(path: &str, device_id: Option<&str>) -> String {
    let resource = path.trim_start_matches('/');
    match device_id {
        Some(id) => format!("{} of device {}", resource, id),
        None => resource.to_string(),
    }
}

/// The service answers id-filtered reads with exactly one element
fn single_element<T>(
    envelope: DataEnvelope<T>,
    tenant_id: i64,
    path: &str,
    device_id: &str,
) -> DomainResult<T> {
    envelope
        .data
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::EmptyResponse {
            tenant_id,
            resource: path.trim_start_matches('/').to_string(),
            device_id: device_id.to_string(),
        })
}

#[async_trait]
impl DeviceDataSource for FdsClient {
    async fn get_specs(&self, tenant: &TenantConfig) -> DomainResult<Vec<DeviceSpec>> {
        Ok(self.fetch(tenant, SPECIFICATIONS_PATH, None).await?.data)
    }

    async fn get_status(
        &self,
        tenant: &TenantConfig,
        device_id: &str,
    ) -> DomainResult<DeviceStatus> {
        self.fetch_single(tenant, STATUS_PATH, device_id).await
    }

    async fn get_diagnostics(
        &self,
        tenant: &TenantConfig,
        device_id: &str,
    ) -> DomainResult<DeviceDiagnostics> {
        self.fetch_single(tenant, DIAGNOSTICS_PATH, device_id).await
    }
}
