use crate::domain::Authenticator;
use async_trait::async_trait;
use common::domain::{DomainError, DomainResult, TenantConfig};
use common::http::JsonHttpClient;
use http::Method;
use serde::Serialize;

pub const AUTH_API_PATH: &str = "/beta/v1/authentication";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Credential exchange against the FDS authentication server
pub struct FdsAuthenticator {
    http: JsonHttpClient,
}

impl FdsAuthenticator {
    pub fn new(http: JsonHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Authenticator for FdsAuthenticator {
    async fn authenticate(&self, tenant: &TenantConfig) -> DomainResult<String> {
        let endpoint = &tenant.endpoint;
        let url = format!("{}{}", endpoint.auth_server.trim_end_matches('/'), AUTH_API_PATH);
        let credentials = Credentials {
            username: &endpoint.username,
            password: &endpoint.password,
        };

        let body = self
            .http
            .send_json(Method::POST, &url, &[], &credentials, tenant.auth_timeout())
            .await
            .map_err(|e| DomainError::Authentication {
                tenant_id: tenant.tenant_id,
                reason: e.to_string(),
            })?;

        let token = String::from_utf8_lossy(&body).trim().replace('"', "");
        if token.is_empty() {
            return Err(DomainError::Authentication {
                tenant_id: tenant.tenant_id,
                reason: "empty token in response".to_string(),
            });
        }

        Ok(token)
    }
}
