mod support;

use async_trait::async_trait;
use collection_orchestrator::domain::{
    CollectionCycle, CollectionScheduler, HierarchyMapper, InFlightCycleStore,
    InMemoryInFlightCycleStore, SchedulerConfig,
};
use common::domain::{
    DeviceDataSource, DeviceDiagnostics, DeviceSpec, DeviceStatus, DomainResult,
    MockTenantConfigRepository, TenantConfig,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use support::{tenant, InMemoryAssetMappings, RecordingSink};

/// Data source whose specification read for tenant 1 blocks until released
#[derive(Default)]
struct GatedDataSource {
    gate: Notify,
    spec_reads: Mutex<HashMap<i64, usize>>,
    entered: AtomicUsize,
}

impl GatedDataSource {
    fn reads(&self, tenant_id: i64) -> usize {
        self.spec_reads
            .lock()
            .unwrap()
            .get(&tenant_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl DeviceDataSource for GatedDataSource {
    async fn get_specs(&self, tenant: &TenantConfig) -> DomainResult<Vec<DeviceSpec>> {
        *self
            .spec_reads
            .lock()
            .unwrap()
            .entry(tenant.tenant_id)
            .or_default() += 1;

        if tenant.tenant_id == 1 {
            self.entered.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
        }
        Ok(vec![])
    }

    async fn get_status(&self, _tenant: &TenantConfig, _device_id: &str) -> DomainResult<DeviceStatus> {
        Ok(DeviceStatus::default())
    }

    async fn get_diagnostics(
        &self,
        _tenant: &TenantConfig,
        _device_id: &str,
    ) -> DomainResult<DeviceDiagnostics> {
        Ok(DeviceDiagnostics::default())
    }
}

fn repository(configs: Vec<TenantConfig>) -> MockTenantConfigRepository {
    let mut repository = MockTenantConfigRepository::new();
    repository
        .expect_list_configs()
        .returning(move || Ok(configs.clone()));
    repository.expect_set_all_inactive().returning(|| Ok(0));
    repository
}

fn scheduler(
    data_source: Arc<GatedDataSource>,
    in_flight: Arc<InMemoryInFlightCycleStore>,
    configs: Vec<TenantConfig>,
) -> CollectionScheduler {
    let cycle = CollectionCycle::new(
        data_source,
        HierarchyMapper::new(
            Arc::new(InMemoryAssetMappings::default()),
            Arc::new(RecordingSink::default()),
        ),
    );
    CollectionScheduler::new(
        Arc::new(repository(configs)),
        Arc::new(cycle),
        in_flight,
        SchedulerConfig::default(),
    )
}

#[tokio::test]
async fn test_in_flight_tenant_is_skipped() {
    let data_source = Arc::new(GatedDataSource::default());
    let in_flight = Arc::new(InMemoryInFlightCycleStore::new());
    assert!(in_flight.try_acquire(1).await.unwrap());

    let scheduler = scheduler(
        data_source.clone(),
        in_flight.clone(),
        vec![tenant(1, &["p1"]), tenant(2, &["p1"])],
    );

    assert_eq!(scheduler.tick().await.unwrap(), 1);
    scheduler.wait_for_cycles().await;

    assert_eq!(data_source.reads(1), 0);
    assert_eq!(data_source.reads(2), 1);
    // the pre-acquired marker is not touched by the scheduler
    assert!(in_flight.is_in_flight(1).await);
    assert!(!in_flight.is_in_flight(2).await);
}

#[tokio::test]
async fn test_running_cycle_blocks_next_tick_for_same_tenant() {
    let data_source = Arc::new(GatedDataSource::default());
    let in_flight = Arc::new(InMemoryInFlightCycleStore::new());
    let scheduler = scheduler(
        data_source.clone(),
        in_flight.clone(),
        vec![tenant(1, &["p1"]), tenant(2, &["p1"])],
    );

    assert_eq!(scheduler.tick().await.unwrap(), 2);
    while data_source.entered.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    // tenant 2 has no interval, wait for its marker to drop
    while in_flight.is_in_flight(2).await {
        tokio::task::yield_now().await;
    }

    assert_eq!(scheduler.tick().await.unwrap(), 1);
    assert!(in_flight.is_in_flight(1).await);

    data_source.gate.notify_one();
    scheduler.wait_for_cycles().await;

    assert_eq!(data_source.reads(1), 1);
    assert_eq!(data_source.reads(2), 2);
    assert!(!in_flight.is_in_flight(1).await);
    assert!(!in_flight.is_in_flight(2).await);
}
