use crate::domain::asset::NewAsset;
use crate::domain::asset_type::AssetTypeDefinition;
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of record written to the downstream platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetrySubtype {
    Info,
    Input,
    Status,
}

impl TelemetrySubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetrySubtype::Info => "info",
            TelemetrySubtype::Input => "input",
            TelemetrySubtype::Status => "status",
        }
    }
}

/// One mapped telemetry record for a single asset
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub subtype: TelemetrySubtype,
    pub timestamp: DateTime<Utc>,
    pub asset_id: i32,
    /// Remote device the record belongs to, not sent downstream
    pub device_id: String,
    pub payload: serde_json::Value,
}

/// Static device information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfoPayload {
    #[serde(rename = "reg_data")]
    pub registration_date: String,
    pub volume: i64,
}

/// Aggregated live values of a station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInputPayload {
    #[serde(rename = "bat_level")]
    pub battery_level: i64,
    /// Hours since last contact
    pub last_contact: f64,
    #[serde(rename = "totalopenings")]
    pub total_openings: i64,
    #[serde(rename = "volumepercent")]
    pub volume_percent: i64,
    pub active: bool,
}

/// Live values of a single container combined with its diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerInputPayload {
    #[serde(rename = "bat_level")]
    pub battery_level: i64,
    /// Openings since the last service
    pub openings: i64,
    pub last_contact: f64,
    pub alarm: bool,
    #[serde(rename = "totalopenings")]
    pub total_openings: i64,
    #[serde(rename = "volumepercent")]
    pub volume_percent: i64,
    /// Days until the expected next service
    #[serde(rename = "time")]
    pub next_service_days: f64,
    #[serde(rename = "lastclean")]
    pub last_service_days: f64,
    pub active: bool,
}

/// Diagnostic projection of a single container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStatusPayload {
    #[serde(rename = "exp_percent")]
    pub expected_percent: i64,
}

/// Downstream platform receiving assets and telemetry
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Create or update an asset type together with its attributes
    async fn upsert_asset_type(&self, asset_type: AssetTypeDefinition) -> DomainResult<()>;

    /// Create or update an asset, returning its id when the platform reports one
    async fn upsert_asset(&self, asset: NewAsset) -> DomainResult<Option<i32>>;

    /// Write one telemetry record
    async fn upsert_telemetry(&self, record: TelemetryRecord) -> DomainResult<()>;
}
