use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::domain::{
    AssetSink, AssetTypeDefinition, DomainError, DomainResult, NewAsset, TelemetryRecord,
    Translation,
};
use common::http::JsonHttpClient;
use http::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct ElionaConfig {
    /// Base URL of the platform API, e.g. `http://api-v2:3000/v2`
    pub api_endpoint: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

/// Quarter hour, hour and day aggregation of averaged attributes
static AVERAGE_RASTERS: [&str; 3] = ["M15", "H1", "DAY"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetTypeBody<'a> {
    name: &'a str,
    custom: bool,
    vendor: &'a str,
    translation: Translation,
    urldoc: &'a str,
    icon: &'a str,
    attributes: Vec<AttributeBody<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributeBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    attribute_type: &'a str,
    subtype: &'a str,
    enable: bool,
    translation: Translation,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    precision: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aggregation_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aggregation_rasters: Option<&'a [&'a str]>,
}

impl<'a> From<&'a AssetTypeDefinition> for AssetTypeBody<'a> {
    fn from(definition: &'a AssetTypeDefinition) -> Self {
        Self {
            name: definition.name,
            custom: false,
            vendor: definition.vendor,
            translation: definition.translation,
            urldoc: definition.documentation_url,
            icon: definition.icon,
            attributes: definition
                .attributes
                .iter()
                .map(|attribute| AttributeBody {
                    name: attribute.name,
                    attribute_type: attribute.attribute_type,
                    subtype: attribute.subtype.as_str(),
                    enable: true,
                    translation: attribute.translation,
                    unit: attribute.unit,
                    precision: attribute.precision,
                    aggregation_mode: attribute.averaged.then_some("avg"),
                    aggregation_rasters: attribute.averaged.then_some(&AVERAGE_RASTERS[..]),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetBody<'a> {
    project_id: &'a str,
    global_asset_identifier: &'a str,
    name: &'a str,
    asset_type: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_locational_asset_id: Option<i32>,
}

#[derive(Deserialize)]
struct AssetResponse {
    #[serde(default)]
    id: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataBody<'a> {
    asset_id: i32,
    subtype: &'a str,
    timestamp: DateTime<Utc>,
    data: &'a serde_json::Value,
}

/// Writes assets and telemetry to the Eliona REST API
pub struct ElionaAssetSink {
    http: JsonHttpClient,
    config: ElionaConfig,
}

impl ElionaAssetSink {
    pub fn new(http: JsonHttpClient, config: ElionaConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AssetSink for ElionaAssetSink {
    async fn upsert_asset_type(&self, asset_type: AssetTypeDefinition) -> DomainResult<()> {
        self.http
            .send_json(
                Method::PUT,
                &self.url("/asset-types"),
                &[(API_KEY_HEADER, self.config.api_key.as_str())],
                &AssetTypeBody::from(&asset_type),
                self.config.request_timeout,
            )
            .await
            .map_err(|e| DomainError::AssetTypeRegistration {
                name: asset_type.name.to_string(),
                reason: e.to_string(),
            })?;

        debug!(name = asset_type.name, "asset type upserted");
        Ok(())
    }

    async fn upsert_asset(&self, asset: NewAsset) -> DomainResult<Option<i32>> {
        let body = AssetBody {
            project_id: &asset.project_id,
            global_asset_identifier: &asset.global_asset_identifier,
            name: &asset.name,
            asset_type: &asset.asset_type,
            description: &asset.description,
            parent_locational_asset_id: asset.parent_asset_id,
        };
        let creation_error = |reason: String| DomainError::AssetCreation {
            project_id: asset.project_id.clone(),
            device_id: asset.device_id.clone(),
            reason,
        };

        let response = self
            .http
            .send_json(
                Method::PUT,
                &self.url("/assets"),
                &[(API_KEY_HEADER, self.config.api_key.as_str())],
                &body,
                self.config.request_timeout,
            )
            .await
            .map_err(|e| creation_error(e.to_string()))?;

        let created: AssetResponse =
            serde_json::from_slice(&response).map_err(|e| creation_error(e.to_string()))?;

        debug!(name = %asset.name, asset_id = ?created.id, "asset upserted");
        Ok(created.id)
    }

    async fn upsert_telemetry(&self, record: TelemetryRecord) -> DomainResult<()> {
        let body = DataBody {
            asset_id: record.asset_id,
            subtype: record.subtype.as_str(),
            timestamp: record.timestamp,
            data: &record.payload,
        };

        self.http
            .send_json(
                Method::PUT,
                &self.url("/data"),
                &[(API_KEY_HEADER, self.config.api_key.as_str())],
                &body,
                self.config.request_timeout,
            )
            .await
            .map_err(|e| DomainError::Telemetry {
                asset_id: record.asset_id,
                device_id: record.device_id.clone(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
