use crate::domain::{CollectionCycle, InFlightCycleStore, SchedulerConfig};
use common::domain::{DomainError, DomainResult, TenantConfig, TenantConfigRepository};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Top-level control loop starting at most one collection cycle per tenant.
///
/// A tenant's single-flight marker is held from the start of its cycle until
/// the tenant's interval has elapsed after the cycle finished.
pub struct CollectionScheduler {
    config_repository: Arc<dyn TenantConfigRepository>,
    cycle: Arc<CollectionCycle>,
    in_flight: Arc<dyn InFlightCycleStore>,
    config: SchedulerConfig,
    cycles: Mutex<JoinSet<()>>,
    shutdown_token: CancellationToken,
}

impl CollectionScheduler {
    pub fn new(
        config_repository: Arc<dyn TenantConfigRepository>,
        cycle: Arc<CollectionCycle>,
        in_flight: Arc<dyn InFlightCycleStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            config_repository,
            cycle,
            in_flight,
            config,
            cycles: Mutex::new(JoinSet::new()),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Tick until `ctx` is cancelled or the configuration list is unavailable.
    ///
    /// On exit, started cycles are awaited and every configuration is marked
    /// inactive.
    pub async fn run(&self, ctx: CancellationToken) -> DomainResult<()> {
        info!(
            tick_interval_secs = self.config.tick_interval_secs,
            "collection scheduler started"
        );

        let result = loop {
            self.reap_finished_cycles().await;

            if let Err(e) = self.tick().await {
                error!(error = %e, "cannot load tenant configurations");
                break Err(e);
            }

            tokio::select! {
                _ = ctx.cancelled() => break Ok(()),
                _ = tokio::time::sleep(self.config.tick_interval()) => {}
            }
        };

        self.shutdown().await;
        result
    }

    /// Scan the configurations once, returning the number of cycles started
    #[instrument(skip(self))]
    pub async fn tick(&self) -> DomainResult<usize> {
        let configs = self
            .config_repository
            .list_configs()
            .await
            .map_err(|e| DomainError::ConfigurationUnavailable(e.to_string()))?;

        if configs.is_empty() {
            return Err(DomainError::NoTenantConfigurations);
        }

        let mut started = 0;
        for config in configs {
            if !config.enabled {
                if config.active {
                    self.mark_active(&config, false).await;
                }
                continue;
            }

            if !config.active {
                self.mark_active(&config, true).await;
            }

            if self.start_cycle(config).await? {
                started += 1;
            }
        }

        debug!(started, "tick finished");
        Ok(started)
    }

    /// Start a cycle unless one is already in flight for the tenant
    pub async fn start_cycle(&self, config: TenantConfig) -> DomainResult<bool> {
        let tenant_id = config.tenant_id;
        if !self.in_flight.try_acquire(tenant_id).await? {
            debug!(tenant_id, "cycle still in flight, skipping");
            return Ok(false);
        }

        let cycle = Arc::clone(&self.cycle);
        let in_flight = Arc::clone(&self.in_flight);
        let shutdown_token = self.shutdown_token.clone();

        self.cycles.lock().await.spawn(async move {
            let interval = config.interval();

            // Inner task so a panicking cycle still releases the marker
            let run = tokio::spawn(async move { cycle.run(&config).await });
            if let Err(e) = run.await {
                error!(tenant_id, error = %e, "collection cycle panicked");
            }

            tokio::select! {
                _ = shutdown_token.cancelled() => {}
                _ = tokio::time::sleep(interval) => {}
            }

            if let Err(e) = in_flight.release(tenant_id).await {
                warn!(tenant_id, error = %e, "failed to release in-flight marker");
            }
        });

        debug!(tenant_id, "collection cycle started");
        Ok(true)
    }

    /// Wait until every started cycle, including its interval, is done
    pub async fn wait_for_cycles(&self) {
        let mut cycles = self.cycles.lock().await;
        while let Some(result) = cycles.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "collection task failed");
            }
        }
    }

    async fn reap_finished_cycles(&self) {
        let mut cycles = self.cycles.lock().await;
        while let Some(result) = cycles.try_join_next() {
            if let Err(e) = result {
                error!(error = %e, "collection task failed");
            }
        }
    }

    async fn mark_active(&self, config: &TenantConfig, active: bool) {
        let tenant_id = config.tenant_id;
        if let Err(e) = self.config_repository.set_active(tenant_id, active).await {
            warn!(tenant_id, active, error = %e, "failed to persist active state");
            return;
        }

        if active {
            info!(
                tenant_id,
                fds_server = %config.endpoint.fds_server,
                auth_server = %config.endpoint.auth_server,
                interval_secs = config.interval_secs,
                auth_timeout_secs = config.auth_timeout_secs,
                request_timeout_secs = config.request_timeout_secs,
                "collection initialized"
            );
        } else {
            info!(tenant_id, "collection disabled");
        }
    }

    async fn shutdown(&self) {
        info!("stopping collection scheduler");
        self.shutdown_token.cancel();
        self.wait_for_cycles().await;

        match self.config_repository.set_all_inactive().await {
            Ok(count) => info!(count, "all configurations marked inactive"),
            Err(e) => warn!(error = %e, "failed to mark configurations inactive"),
        }
    }
}
