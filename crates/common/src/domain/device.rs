use crate::domain::asset::AssetKind;
use crate::domain::result::DomainResult;
use crate::domain::tenant_config::TenantConfig;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{"data": [...]}` envelope used by every data endpoint of the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DataEnvelope<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecGeneric {
    #[serde(deserialize_with = "null_as_default")]
    pub device_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub registration_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub device_serial: String,
    #[serde(deserialize_with = "null_as_default")]
    pub manufacturer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTypeSpecific {
    pub bin_volume: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub channel: String,
    /// Sub-components, only populated for stations
    #[serde(deserialize_with = "null_as_default")]
    pub component_id_list: Vec<DeviceSpec>,
    pub total_combined_volume: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub content_category: String,
}

/// Device specification as returned by the specification endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub device_id: String,
    pub generic: SpecGeneric,
    pub device_type_specific: SpecTypeSpecific,
}

impl DeviceSpec {
    pub fn kind(&self) -> AssetKind {
        if self.device_type_specific.component_id_list.is_empty() {
            AssetKind::Container
        } else {
            AssetKind::Station
        }
    }

    /// Combined volume of a station if reported, otherwise the bin volume
    pub fn effective_volume(&self) -> i64 {
        match self.device_type_specific.total_combined_volume {
            0 => self.device_type_specific.bin_volume,
            combined => combined,
        }
    }

    /// Human readable asset name, e.g. `"FDS-0815 (Trio)"`
    pub fn asset_name(&self) -> String {
        format!("{} ({})", self.device_id, self.generic.model)
    }

    pub fn asset_description(&self) -> String {
        format!(
            "{} - {}",
            self.device_type_specific.channel, self.device_type_specific.content_category
        )
    }
}

/// Device tree with the station/container shape resolved once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceNode {
    Leaf(DeviceSpec),
    Station {
        spec: DeviceSpec,
        components: Vec<DeviceNode>,
    },
}

impl DeviceNode {
    pub fn from_spec(mut spec: DeviceSpec) -> Self {
        match spec.kind() {
            AssetKind::Container => DeviceNode::Leaf(spec),
            AssetKind::Station => {
                let components = std::mem::take(&mut spec.device_type_specific.component_id_list)
                    .into_iter()
                    .map(DeviceNode::from_spec)
                    .collect();
                DeviceNode::Station { spec, components }
            }
        }
    }

    pub fn spec(&self) -> &DeviceSpec {
        match self {
            DeviceNode::Leaf(spec) => spec,
            DeviceNode::Station { spec, .. } => spec,
        }
    }

    pub fn components(&self) -> &[DeviceNode] {
        match self {
            DeviceNode::Leaf(_) => &[],
            DeviceNode::Station { components, .. } => components,
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            DeviceNode::Leaf(_) => AssetKind::Container,
            DeviceNode::Station { .. } => AssetKind::Station,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.spec().device_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusGeneric {
    #[serde(deserialize_with = "null_as_default")]
    pub last_contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillingLevel {
    pub level: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTypeSpecific {
    // single container
    pub battery_level: f64,
    pub inputs_count: i64,
    pub last_empty_count: i64,
    pub bin_alarm: bool,
    // station
    pub average_battery_level: f64,
    pub average_filling_level: f64,
    pub total_inputs_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub component_statuses: Vec<DeviceStatus>,
    #[serde(deserialize_with = "null_as_default")]
    pub filling_level: Vec<FillingLevel>,
}

/// Live measurements of a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub device_id: String,
    pub generic: StatusGeneric,
    pub device_type_specific: StatusTypeSpecific,
}

impl DeviceStatus {
    /// A status carrying component statuses belongs to a station.
    pub fn is_station(&self) -> bool {
        !self.device_type_specific.component_statuses.is_empty()
    }

    /// First reported fill level of a container as a fraction
    pub fn fill_level(&self) -> Option<f64> {
        self.device_type_specific
            .filling_level
            .first()
            .map(|filling| filling.level)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagGeneric {
    #[serde(deserialize_with = "null_as_default")]
    pub last_service: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagTypeSpecific {
    // single container
    #[serde(deserialize_with = "null_as_default")]
    pub expected_next_service: String,
    pub expected_filling_level: f64,
    // station
    #[serde(deserialize_with = "null_as_default")]
    pub station_expected_next_service: String,
    pub average_expected_filling_level: f64,
}

/// Diagnostic projections of a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDiagnostics {
    #[serde(deserialize_with = "null_as_default")]
    pub device_id: String,
    pub generic: DiagGeneric,
    pub device_type_specific: DiagTypeSpecific,
    #[serde(deserialize_with = "null_as_default")]
    pub component_diagnostics: Vec<DeviceDiagnostics>,
}

/// Read access to the remote device service of a tenant
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceDataSource: Send + Sync {
    /// Full specification tree of every device of the tenant
    async fn get_specs(&self, tenant: &TenantConfig) -> DomainResult<Vec<DeviceSpec>>;

    async fn get_status(&self, tenant: &TenantConfig, device_id: &str)
        -> DomainResult<DeviceStatus>;

    async fn get_diagnostics(
        &self,
        tenant: &TenantConfig,
        device_id: &str,
    ) -> DomainResult<DeviceDiagnostics>;
}
