use crate::domain::{BearerToken, TokenStore};
use async_trait::async_trait;
use common::domain::DomainResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-lifetime token storage keyed by tenant id
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<i64, BearerToken>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, tenant_id: i64) -> DomainResult<Option<BearerToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&tenant_id).cloned())
    }

    async fn put(&self, tenant_id: i64, token: BearerToken) -> DomainResult<()> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(tenant_id, token);
        Ok(())
    }

    async fn remove(&self, tenant_id: i64) -> DomainResult<Option<BearerToken>> {
        let mut tokens = self.tokens.write().await;
        Ok(tokens.remove(&tenant_id))
    }
}
