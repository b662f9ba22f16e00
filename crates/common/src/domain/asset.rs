use crate::domain::result::DomainResult;
use async_trait::async_trait;

pub const STATION_ASSET_TYPE: &str = "Hailo FDS Recycling Station";
pub const CONTAINER_ASSET_TYPE: &str = "Hailo FDS Bin";

/// Classification of a device in the remote hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Aggregating device composed of component containers
    Station,
    /// Leaf device with a single fill-level sensor
    Container,
}

impl AssetKind {
    pub fn asset_type(&self) -> &'static str {
        match self {
            AssetKind::Station => STATION_ASSET_TYPE,
            AssetKind::Container => CONTAINER_ASSET_TYPE,
        }
    }
}

/// Known (tenant, project, device) -> downstream asset id association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMapping {
    pub tenant_id: i64,
    pub project_id: String,
    pub device_id: String,
    pub asset_id: i32,
}

/// Asset to be created in the downstream platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub project_id: String,
    /// Remote device the asset stands for, used in error reports only
    pub device_id: String,
    pub global_asset_identifier: String,
    pub name: String,
    pub asset_type: String,
    pub description: String,
    /// Set for station components, pointing at the station asset
    pub parent_asset_id: Option<i32>,
}

/// Repository trait for asset identity lookups.
///
/// Mappings are only ever read and inserted, never updated or deleted.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AssetMappingRepository: Send + Sync {
    /// Get the downstream asset id of a device, if one was created before
    async fn get_asset_id(
        &self,
        tenant_id: i64,
        project_id: &str,
        device_id: &str,
    ) -> DomainResult<Option<i32>>;

    /// Remember a newly created asset
    async fn insert_asset_mapping(&self, mapping: AssetMapping) -> DomainResult<()>;
}
