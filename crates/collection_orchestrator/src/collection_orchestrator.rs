use crate::domain::{
    register_asset_types, CollectionCycle, CollectionScheduler, HierarchyMapper,
    InMemoryInFlightCycleStore, InMemoryTokenStore, SchedulerConfig, TokenCache,
};
use crate::eliona::{ElionaAssetSink, ElionaConfig};
use crate::fds::{FdsAuthenticator, FdsClient};
use common::domain::{AssetMappingRepository, AssetSink, DomainResult, TenantConfigRepository};
use common::http::JsonHttpClient;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct CollectionOrchestratorConfig {
    pub scheduler: SchedulerConfig,
    pub eliona: ElionaConfig,
}

/// Wires the token cache, FDS client, mapper and scheduler together
pub struct CollectionOrchestrator {
    scheduler: Arc<CollectionScheduler>,
    asset_sink: Arc<dyn AssetSink>,
}

impl CollectionOrchestrator {
    pub fn new(
        config_repository: Arc<dyn TenantConfigRepository>,
        asset_mappings: Arc<dyn AssetMappingRepository>,
        http: JsonHttpClient,
        config: CollectionOrchestratorConfig,
    ) -> Self {
        debug!("initializing collection orchestrator");

        let token_cache = Arc::new(TokenCache::new(
            Arc::new(InMemoryTokenStore::new()),
            Arc::new(FdsAuthenticator::new(http.clone())),
        ));
        let data_source = Arc::new(FdsClient::new(http.clone(), token_cache));
        let asset_sink: Arc<dyn AssetSink> =
            Arc::new(ElionaAssetSink::new(http, config.eliona));

        let cycle = Arc::new(CollectionCycle::new(
            data_source,
            HierarchyMapper::new(asset_mappings, Arc::clone(&asset_sink)),
        ));

        let scheduler = Arc::new(CollectionScheduler::new(
            config_repository,
            cycle,
            Arc::new(InMemoryInFlightCycleStore::new()),
            config.scheduler,
        ));

        Self {
            scheduler,
            asset_sink,
        }
    }

    /// Make sure the downstream asset types exist before the first cycle
    pub async fn register_asset_types(&self) -> DomainResult<()> {
        register_asset_types(self.asset_sink.as_ref()).await
    }

    #[allow(clippy::type_complexity)]
    pub fn into_runner_process(
        self,
    ) -> Box<
        dyn FnOnce(
                CancellationToken,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
            > + Send,
    > {
        Box::new({
            let scheduler = self.scheduler;
            move |ctx| Box::pin(async move { Ok(scheduler.run(ctx).await?) })
        })
    }
}
