mod config;

use anyhow::Result;
use common::{
    Argon2PasswordService, AuthTokenProvider, CouchClient, CouchConfig, CouchDeviceRepository,
    CouchPolicyRepository, CouchUserRepository, GatewayConfig, HttpGatewayClient,
    JwtAuthTokenProvider, JwtConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trvhub_api::domain::{DeviceService, DiscoveryService, PolicyService, UserService};
use trvhub_api::http::{run_http_server, AppState, HttpServerConfig};
use trvhub_api::poller::DiscoveryPoller;

#[tokio::main]
async fn main() {
    let config = match config::ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("starting trvhub-all-in-one service");

    let cancellation_token = CancellationToken::new();

    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    if let Err(e) = run_service(config, cancellation_token).await {
        error!("service failed: {}", e);
        std::process::exit(1);
    }

    info!("service stopped gracefully");
}

async fn run_service(
    config: config::ServiceConfig,
    cancellation_token: CancellationToken,
) -> Result<()> {
    // Document store
    let couch_client = CouchClient::new(CouchConfig {
        url: config.couchdb_url,
        username: config.couchdb_username,
        password: config.couchdb_password,
        retry_attempts: config.couchdb_retry_attempts,
        retry_backoff_ms: config.couchdb_retry_backoff_ms,
    })?;
    couch_client.ping().await?;

    let device_repository = Arc::new(CouchDeviceRepository::new(couch_client.clone()));
    let user_repository = Arc::new(CouchUserRepository::new(couch_client.clone()));
    let policy_repository = Arc::new(CouchPolicyRepository::new(couch_client));

    // Hardware gateway
    let gateway: Arc<HttpGatewayClient> = Arc::new(HttpGatewayClient::new(GatewayConfig {
        url: config.gateway_url,
    })?);

    // Auth providers
    let auth_token_provider: Arc<dyn AuthTokenProvider> = Arc::new(JwtAuthTokenProvider::new(
        JwtConfig::new(config.jwt_secret, config.jwt_expiration_hours),
    ));
    let password_service = Arc::new(Argon2PasswordService::new());

    // Domain services
    let device_service = Arc::new(DeviceService::new(device_repository, gateway.clone()));
    let discovery_service = Arc::new(DiscoveryService::new(gateway, device_service.clone()));
    let user_service = Arc::new(UserService::new(
        user_repository,
        auth_token_provider.clone(),
        password_service,
    ));
    let policy_service = Arc::new(PolicyService::new(policy_repository));

    // Background discovery
    let poller = DiscoveryPoller::new(
        discovery_service.clone(),
        Duration::from_secs(config.poll_interval_secs),
    );
    let poller_handle = tokio::spawn(poller.run(cancellation_token.clone()));

    let state = AppState {
        device_service,
        discovery_service,
        user_service,
        policy_service,
        auth_token_provider,
    };

    let server_config = HttpServerConfig {
        host: config.http_host,
        port: config.http_port,
    };

    let result = run_http_server(server_config, state, cancellation_token.clone()).await;

    // The server is down; stop the poller too
    cancellation_token.cancel();
    let _ = poller_handle.await;

    result
}
