use crate::domain::{DeviceService, DiscoveryService, PolicyService, UserService};
use crate::http::{auth, device_handler, policy_handler, user_handler};
use axum::routing::{get, post};
use axum::{middleware, Router};
use common::AuthTokenProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler dependencies
#[derive(Clone)]
pub struct AppState {
    pub device_service: Arc<DeviceService>,
    pub discovery_service: Arc<DiscoveryService>,
    pub user_service: Arc<UserService>,
    pub policy_service: Arc<PolicyService>,
    pub auth_token_provider: Arc<dyn AuthTokenProvider>,
}

/// HTTP server configuration
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Assemble the versioned API router. Registration and login are the only
/// routes reachable without an access token.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/user", post(user_handler::register_user))
        .route("/user/login", post(user_handler::login));

    let protected = Router::new()
        .route(
            "/devices",
            post(device_handler::create_devices).get(device_handler::discover_devices),
        )
        .route(
            "/devices/:id",
            get(device_handler::get_device)
                .put(device_handler::update_device)
                .delete(device_handler::delete_device),
        )
        .route(
            "/user/:id",
            get(user_handler::get_user)
                .put(user_handler::update_user)
                .delete(user_handler::delete_user),
        )
        .route(
            "/policy",
            post(policy_handler::create_policy).get(policy_handler::list_policies),
        )
        .route(
            "/policy/:id",
            get(policy_handler::get_policy)
                .put(policy_handler::update_policy)
                .delete(policy_handler::delete_policy),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server with graceful shutdown
pub async fn run_http_server(
    config: HttpServerConfig,
    state: AppState,
    cancellation_token: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let router = build_router(state);

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        cancellation_token.cancelled().await;
        info!("HTTP server shutdown signal received");
    });

    match server.await {
        Ok(()) => {
            info!("HTTP server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!("HTTP server error: {}", e);
            Err(e.into())
        }
    }
}
