use async_trait::async_trait;
use common::domain::DomainResult;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Single-flight markers for tenant collection cycles.
///
/// A marker is held from the start of a cycle until its interval has elapsed.
#[async_trait]
pub trait InFlightCycleStore: Send + Sync {
    /// Set the marker, returning false if the tenant already holds one
    async fn try_acquire(&self, tenant_id: i64) -> DomainResult<bool>;

    async fn release(&self, tenant_id: i64) -> DomainResult<()>;
}

/// In-memory implementation of InFlightCycleStore using a HashSet
pub struct InMemoryInFlightCycleStore {
    tenants: Arc<RwLock<HashSet<i64>>>,
}

impl InMemoryInFlightCycleStore {
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn is_in_flight(&self, tenant_id: i64) -> bool {
        self.tenants.read().await.contains(&tenant_id)
    }
}

impl Default for InMemoryInFlightCycleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InFlightCycleStore for InMemoryInFlightCycleStore {
    async fn try_acquire(&self, tenant_id: i64) -> DomainResult<bool> {
        let mut tenants = self.tenants.write().await;
        Ok(tenants.insert(tenant_id))
    }

    async fn release(&self, tenant_id: i64) -> DomainResult<()> {
        let mut tenants = self.tenants.write().await;
        tenants.remove(&tenant_id);
        Ok(())
    }
}
