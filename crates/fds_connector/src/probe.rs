use anyhow::{Context, Result};
use collection_orchestrator::domain::{InMemoryTokenStore, TokenCache};
use collection_orchestrator::fds::{FdsAuthenticator, FdsClient};
use common::domain::{DeviceDataSource, DeviceSpec, FdsEndpoint, TenantConfig};
use common::http::JsonHttpClient;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

/// Dumps the complete device data of one endpoint to `out` without touching
/// the database or the downstream platform.
pub async fn probe(endpoint: FdsEndpoint, out: &mut impl Write) -> Result<()> {
    let http = JsonHttpClient::new();
    let token_cache = TokenCache::new(
        Arc::new(InMemoryTokenStore::new()),
        Arc::new(FdsAuthenticator::new(http.clone())),
    );
    let client = FdsClient::new(http, Arc::new(token_cache));

    probe_with(&client, TenantConfig::ad_hoc(endpoint), out).await
}

pub async fn probe_with(
    data_source: &dyn DeviceDataSource,
    tenant: TenantConfig,
    out: &mut impl Write,
) -> Result<()> {
    let redacted = FdsEndpoint {
        password: "***".to_string(),
        ..tenant.endpoint.clone()
    };
    section(out, "Server config", &redacted)?;

    let specs = data_source
        .get_specs(&tenant)
        .await
        .context("reading device specifications")?;

    for spec in &specs {
        print_device(data_source, &tenant, spec, out).await?;
        for component in &spec.device_type_specific.component_id_list {
            print_device(data_source, &tenant, component, out).await?;
        }
    }

    Ok(())
}

async fn print_device(
    data_source: &dyn DeviceDataSource,
    tenant: &TenantConfig,
    spec: &DeviceSpec,
    out: &mut impl Write,
) -> Result<()> {
    let device_id = &spec.device_id;
    section(out, &format!("Device {}", device_id), spec)?;

    match data_source.get_status(tenant, device_id).await {
        Ok(status) => section(out, &format!("Status {}", device_id), &status)?,
        Err(e) => failure(out, &format!("Status {}", device_id), &e)?,
    }

    match data_source.get_diagnostics(tenant, device_id).await {
        Ok(diagnostics) => section(out, &format!("Diagnostic {}", device_id), &diagnostics)?,
        Err(e) => failure(out, &format!("Diagnostic {}", device_id), &e)?,
    }

    Ok(())
}

fn section(out: &mut impl Write, title: &str, value: &impl Serialize) -> Result<()> {
    writeln!(out, " ---- {} ----", title)?;
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn failure(out: &mut impl Write, title: &str, error: &dyn std::fmt::Display) -> Result<()> {
    writeln!(out, " ---- {} ----", title)?;
    writeln!(out, "error: {}", error)?;
    Ok(())
}
