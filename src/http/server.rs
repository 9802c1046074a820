//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the regex [`Dispatcher`]
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run request handling on the blocking pool
//! - Bind server to listener and drain on shutdown

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response;
use crate::lifecycle::shutdown::wait_for;
use crate::lifecycle::GracePeriod;
use crate::observability::metrics;
use crate::routing::{Dispatcher, RouteError, RouteTable};

/// Fatal server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid route table: {0}")]
    Route(#[from] RouteError),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// HTTP server for the barcode service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server with the default route table.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let table = handlers::route_table(&config.cache)?;
        Ok(Self::with_table(config, table))
    }

    /// Create a server dispatching over `table`.
    pub fn with_table(config: ServerConfig, table: RouteTable) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(table),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request.headers().request_id(),
                    )
                }),
            )
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// Requests still running once the grace period elapses are abandoned
    /// and [`ServerError::ShutdownTimeout`] is returned.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let grace = GracePeriod::from_secs(self.config.shutdown.grace_period_secs);
        tracing::info!(address = %addr, "HTTP server starting");

        let (draining_tx, draining_rx) = oneshot::channel();
        let signal = async move {
            wait_for(shutdown).await;
            tracing::info!("Draining in-flight requests");
            let _ = draining_tx.send(());
        };

        let mut serve = tokio::spawn(async move {
            axum::serve(listener, self.router.into_make_service())
                .with_graceful_shutdown(signal)
                .await
        });

        tokio::select! {
            result = &mut serve => {
                result??;
                tracing::info!("HTTP server stopped");
                return Ok(());
            }
            _ = draining_rx => {}
        }

        match tokio::time::timeout(grace.duration(), &mut serve).await {
            Ok(result) => {
                result??;
                tracing::info!("HTTP server stopped");
                Ok(())
            }
            Err(_) => {
                serve.abort();
                tracing::error!(
                    grace_period = ?grace.duration(),
                    "Shutdown grace period elapsed with requests in flight"
                );
                Err(ServerError::ShutdownTimeout(grace.duration()))
            }
        }
    }
}

/// Fallback handler: every request goes through the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let request_id = parts.headers.request_id().to_string();

    let dispatcher = state.dispatcher.clone();
    let response =
        match tokio::task::spawn_blocking(move || dispatcher.dispatch(&parts).into_response())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Handler task failed");
                response::internal_error()
            }
        };

    let status = response.status();
    metrics::record_request(method.as_str(), status.as_u16(), start_time);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        "Request handled"
    );

    response
}
