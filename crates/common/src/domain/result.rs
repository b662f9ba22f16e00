use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No tenant configurations found")]
    NoTenantConfigurations,

    #[error("Configuration store unavailable: {0}")]
    ConfigurationUnavailable(String),

    #[error("Authentication failed for tenant {tenant_id}: {reason}")]
    Authentication { tenant_id: i64, reason: String },

    #[error("Reading {resource} failed for tenant {tenant_id}: {reason}")]
    RemoteRead {
        tenant_id: i64,
        resource: String,
        reason: String,
    },

    #[error("Empty {resource} response for tenant {tenant_id} and device {device_id}")]
    EmptyResponse {
        tenant_id: i64,
        resource: String,
        device_id: String,
    },

    #[error("Asset type registration failed for {name}: {reason}")]
    AssetTypeRegistration { name: String, reason: String },

    #[error("Asset creation failed for device {device_id} in project {project_id}: {reason}")]
    AssetCreation {
        project_id: String,
        device_id: String,
        reason: String,
    },

    #[error("No asset id returned for device {device_id} in project {project_id}")]
    MissingAssetId {
        project_id: String,
        device_id: String,
    },

    #[error("No asset mapping for tenant {tenant_id}, project {project_id} and device {device_id}")]
    UnmappedDevice {
        tenant_id: i64,
        project_id: String,
        device_id: String,
    },

    #[error("Telemetry write failed for asset {asset_id} of device {device_id}: {reason}")]
    Telemetry {
        asset_id: i32,
        device_id: String,
        reason: String,
    },

    #[error("Repository error: {0}")]
    RepositoryError(anyhow::Error),
}
