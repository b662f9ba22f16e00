use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time without contact after which a device is reported inactive (24 hours)
pub const DEFAULT_INACTIVITY_THRESHOLD_SECS: i64 = 60 * 60 * 24;

/// Auth timeout used for ad-hoc configurations (probe mode)
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;

/// Request timeout used for ad-hoc configurations (probe mode)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Remote FDS endpoint and credentials of a tenant.
///
/// Stored as a JSON document next to the scheduling columns; missing keys
/// read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FdsEndpoint {
    pub username: String,
    pub password: String,
    pub fds_server: String,
    pub auth_server: String,
}

/// One configured remote endpoint with credentials and scheduling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TenantConfig {
    pub tenant_id: i64,
    pub description: Option<String>,
    pub endpoint: FdsEndpoint,
    pub enabled: bool,
    /// Operational state, only written by the scheduler
    pub active: bool,
    pub interval_secs: u64,
    pub auth_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub inactivity_threshold_secs: i64,
    /// Downstream projects every asset and record is replicated to
    pub project_ids: Vec<String>,
}

impl TenantConfig {
    /// Build an unsaved configuration for talking to an endpoint directly.
    pub fn ad_hoc(endpoint: FdsEndpoint) -> Self {
        Self {
            tenant_id: 0,
            description: None,
            endpoint,
            enabled: true,
            active: false,
            interval_secs: 0,
            auth_timeout_secs: DEFAULT_AUTH_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            inactivity_threshold_secs: DEFAULT_INACTIVITY_THRESHOLD_SECS,
            project_ids: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration store for tenant configurations.
///
/// CRUD of the records happens elsewhere; the collector only lists them and
/// flips the `active` flag.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TenantConfigRepository: Send + Sync {
    /// List all configurations, enabled or not
    async fn list_configs(&self) -> DomainResult<Vec<TenantConfig>>;

    /// Persist the operational state of one configuration
    async fn set_active(&self, tenant_id: i64, active: bool) -> DomainResult<()>;

    /// Mark every configuration inactive, returning the number of rows touched
    async fn set_all_inactive(&self) -> DomainResult<u64>;
}
