use common::domain::{fds_asset_types, AssetSink, DomainResult};
use tracing::info;

/// Upsert every asset type the connector creates assets of.
///
/// Registration is idempotent, so it runs on every start.
pub async fn register_asset_types(sink: &dyn AssetSink) -> DomainResult<()> {
    for asset_type in fds_asset_types() {
        let name = asset_type.name;
        sink.upsert_asset_type(asset_type).await?;
        info!(asset_type = name, "asset type registered");
    }
    Ok(())
}
