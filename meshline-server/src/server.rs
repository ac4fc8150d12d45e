use crate::api::{self, UploadLimits};
use crate::config::ServerConfig;
use crate::registry::Registry;
use crate::session::{SessionCommand, SessionCoordinator};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::Context;
use axum::Router;
use axum::extract::FromRef;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub limits: UploadLimits,
}

impl FromRef<AppState> for SignalingService {
    fn from_ref(state: &AppState) -> Self {
        state.signaling.clone()
    }
}

impl FromRef<AppState> for UploadLimits {
    fn from_ref(state: &AppState) -> Self {
        state.limits
    }
}

/// Creates the registry, the coordinator task and the signaling service
/// that feeds it.
pub fn start_session(config: &ServerConfig) -> SignalingService {
    let (session_tx, session_rx) = mpsc::channel::<SessionCommand>(config.session_queue);
    let signaling = SignalingService::new(session_tx, config.ice_server_configs());

    let coordinator = SessionCoordinator::new(
        Registry::new(),
        session_rx,
        Arc::new(signaling.clone()),
    );
    tokio::spawn(async move {
        coordinator.run().await;
    });

    signaling
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .nest("/api", api::router(state.limits))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub fn app(config: &ServerConfig) -> Router {
    let state = AppState {
        signaling: start_session(config),
        limits: UploadLimits {
            max_bytes: config.max_upload_bytes,
        },
    };
    build_router(state)
}

/// A server bound and serving in the background.
pub struct ServerHandle {
    pub local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.local_addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.local_addr, path)
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Binds `config.bind` and serves on a background task.
pub async fn spawn(config: ServerConfig) -> anyhow::Result<ServerHandle> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let local_addr = listener.local_addr()?;
    let router = app(&config);

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Server stopped: {}", e);
        }
    });

    Ok(ServerHandle { local_addr, task })
}

/// Serves until ctrl-c.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Signaling server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
