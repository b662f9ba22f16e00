use crate::domain::{BearerToken, TokenState};
use async_trait::async_trait;
use chrono::Utc;
use common::domain::{DomainResult, TenantConfig};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Exchanges tenant credentials for a fresh bearer token body
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, tenant: &TenantConfig) -> DomainResult<String>;
}

/// Per-tenant token storage
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, tenant_id: i64) -> DomainResult<Option<BearerToken>>;

    async fn put(&self, tenant_id: i64, token: BearerToken) -> DomainResult<()>;

    async fn remove(&self, tenant_id: i64) -> DomainResult<Option<BearerToken>>;
}

/// Hands out a valid bearer token per tenant, authenticating when the cached
/// one is missing or no longer valid.
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
    authenticator: Arc<dyn Authenticator>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn TokenStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    pub async fn get_token(&self, tenant: &TenantConfig) -> DomainResult<BearerToken> {
        self.get_token_at(tenant, Utc::now().timestamp()).await
    }

    #[instrument(skip(self, tenant), fields(tenant_id = tenant.tenant_id))]
    pub async fn get_token_at(&self, tenant: &TenantConfig, now: i64) -> DomainResult<BearerToken> {
        if let Some(token) = self.store.get(tenant.tenant_id).await? {
            match token.state_at(now) {
                TokenState::Valid => return Ok(token),
                state => debug!(?state, "cached token unusable, refreshing"),
            }
        }

        info!("creating new authentication token");
        let body = match self.authenticator.authenticate(tenant).await {
            Ok(body) => body,
            Err(e) => {
                self.store.remove(tenant.tenant_id).await?;
                return Err(e);
            }
        };

        let token = BearerToken::parse(&body);
        if !token.is_valid_at(now) {
            warn!(state = ?token.state_at(now), "freshly issued token is not valid");
        }
        self.store.put(tenant.tenant_id, token.clone()).await?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{encode_segment, InMemoryTokenStore};
    use common::domain::{DomainError, FdsEndpoint};

    const NOW: i64 = 1_700_000_000;

    fn tenant(tenant_id: i64) -> TenantConfig {
        TenantConfig {
            tenant_id,
            ..TenantConfig::ad_hoc(FdsEndpoint::default())
        }
    }

    fn raw_token(iat: i64, exp: i64) -> String {
        format!(
            "\"{}.{}.sig\"",
            encode_segment(r#"{"alg":"HS256","typ":"JWT"}"#),
            encode_segment(&format!(r#"{{"iat":{},"exp":{}}}"#, iat, exp))
        )
    }

    #[tokio::test]
    async fn test_valid_cached_token_is_reused() {
        let store = Arc::new(InMemoryTokenStore::new());
        store
            .put(1, BearerToken::parse(&raw_token(NOW, NOW + 241)))
            .await
            .unwrap();

        let mut authenticator = MockAuthenticator::new();
        authenticator.expect_authenticate().times(0);

        let cache = TokenCache::new(store, Arc::new(authenticator));
        let token = cache.get_token_at(&tenant(1), NOW).await.unwrap();
        assert!(token.is_valid_at(NOW));
    }

    #[tokio::test]
    async fn test_expiring_token_triggers_refresh() {
        let store = Arc::new(InMemoryTokenStore::new());
        store
            .put(1, BearerToken::parse(&raw_token(NOW, NOW + 239)))
            .await
            .unwrap();

        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_authenticate()
            .times(1)
            .returning(|_| Ok(raw_token(NOW, NOW + 3600)));

        let cache = TokenCache::new(store.clone(), Arc::new(authenticator));
        let token = cache.get_token_at(&tenant(1), NOW).await.unwrap();

        assert_eq!(token.claims().map(|c| c.exp), Some(NOW + 3600));
        assert_eq!(store.get(1).await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn test_token_from_the_future_triggers_refresh() {
        let store = Arc::new(InMemoryTokenStore::new());
        store
            .put(1, BearerToken::parse(&raw_token(NOW + 6, NOW + 3600)))
            .await
            .unwrap();

        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_authenticate()
            .times(1)
            .returning(|_| Ok(raw_token(NOW, NOW + 3600)));

        let cache = TokenCache::new(store, Arc::new(authenticator));
        let token = cache.get_token_at(&tenant(1), NOW).await.unwrap();
        assert_eq!(token.claims().map(|c| c.iat), Some(NOW));
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_cache_unset() {
        let store = Arc::new(InMemoryTokenStore::new());
        store
            .put(1, BearerToken::parse(&raw_token(NOW - 7200, NOW - 3600)))
            .await
            .unwrap();

        let mut authenticator = MockAuthenticator::new();
        authenticator.expect_authenticate().returning(|tenant| {
            Err(DomainError::Authentication {
                tenant_id: tenant.tenant_id,
                reason: "unauthorized".to_string(),
            })
        });

        let cache = TokenCache::new(store.clone(), Arc::new(authenticator));
        let result = cache.get_token_at(&tenant(1), NOW).await;

        assert!(matches!(
            result,
            Err(DomainError::Authentication { tenant_id: 1, .. })
        ));
        assert_eq!(store.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tokens_are_kept_per_tenant() {
        let store = Arc::new(InMemoryTokenStore::new());
        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_authenticate()
            .times(2)
            .returning(|tenant| Ok(raw_token(NOW + tenant.tenant_id, NOW + 3600)));

        let cache = TokenCache::new(store, Arc::new(authenticator));
        let first = cache.get_token_at(&tenant(1), NOW).await.unwrap();
        let second = cache.get_token_at(&tenant(2), NOW).await.unwrap();
        let first_again = cache.get_token_at(&tenant(1), NOW).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first, first_again);
    }
}
