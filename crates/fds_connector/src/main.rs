mod config;
mod probe;

use clap::{Args, Parser, Subcommand};
use collection_orchestrator::{CollectionOrchestrator, CollectionOrchestratorConfig};
use common::domain::FdsEndpoint;
use common::http::JsonHttpClient;
use common::postgres::{
    MigrationRunner, PostgresAssetMappingRepository, PostgresClient,
    PostgresTenantConfigRepository,
};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryProviders};
use crate::config::ServiceConfig;
use fds_runner::Runner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "FDS waste-container data connector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect data for every configured tenant (default)
    Run,
    /// Print the complete device data of one FDS endpoint and exit
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Base URL of the FDS authentication server
    #[arg(long)]
    auth_server: String,

    #[arg(long)]
    username: String,

    #[arg(long, env = "FDS_PROBE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Base URL of the FDS data API
    #[arg(long)]
    fds_server: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_service().await,
        Command::Probe(args) => {
            let endpoint = FdsEndpoint {
                username: args.username,
                password: args.password,
                fds_server: args.fds_server,
                auth_server: args.auth_server,
            };
            if let Err(e) = probe::probe(endpoint, &mut std::io::stdout().lock()).await {
                eprintln!("Probe failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run_service() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> =
        match init_telemetry(&config.telemetry()) {
            Ok(providers) => providers,
            Err(e) => {
                eprintln!("Failed to initialize telemetry: {}", e);
                std::process::exit(1);
            }
        };

    info!(
        otel_enabled = config.otel_enabled,
        tick_interval_secs = config.tick_interval_secs,
        "Starting fds-connector service"
    );
    debug!(
        postgres_host = %config.postgres_host,
        eliona_api_endpoint = %config.eliona_api_endpoint,
        "Configuration loaded"
    );

    let orchestrator = match initialize_orchestrator(&config).await {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Failed to initialize collection: {:#}", e);
            shutdown_telemetry(telemetry_providers);
            std::process::exit(1);
        }
    };

    Runner::new()
        .with_named_process("collection_orchestrator", orchestrator.into_runner_process())
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            shutdown_telemetry(telemetry_providers);
            info!("Cleanup complete");
            Ok(())
        })
        .with_shutdown_timeout(Duration::from_secs(config.shutdown_timeout_secs))
        .with_closer_timeout(Duration::from_secs(config.closer_timeout_secs))
        .run()
        .await;
}

async fn initialize_orchestrator(config: &ServiceConfig) -> anyhow::Result<CollectionOrchestrator> {
    let postgres_config = config.postgres();

    info!("Running PostgreSQL migrations...");
    MigrationRunner::new(
        postgres_config.goose_binary_path.clone(),
        postgres_config.migrations_dir.clone(),
        postgres_config.dsn(),
    )
    .run_migrations()
    .await?;

    let postgres_client = PostgresClient::new(&postgres_config)?;
    postgres_client.ping().await?;

    let orchestrator = CollectionOrchestrator::new(
        Arc::new(PostgresTenantConfigRepository::new(postgres_client.clone())),
        Arc::new(PostgresAssetMappingRepository::new(postgres_client)),
        JsonHttpClient::new(),
        CollectionOrchestratorConfig {
            scheduler: config.scheduler(),
            eliona: config.eliona(),
        },
    );

    info!("Registering asset types...");
    orchestrator.register_asset_types().await?;

    Ok(orchestrator)
}
