// ABOUTME: HTTP server assembly: router, CORS, request tracing, and serving
// ABOUTME: Shared by the wavy-server binary and the end-to-end tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use http::{header::HeaderName, HeaderValue, Method, StatusCode};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::resources::ServerResources;
use crate::routes::{HealthRoutes, LlmRoutes, PatientRoutes, PlanRoutes, ProcurementRoutes};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// LLM plan generation for several patients can take minutes
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Configure CORS from `ALLOWED_ORIGINS`
///
/// An empty list or `*` allows any origin.
#[must_use]
pub fn setup_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "*")
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    let allow_origin = if origins.is_empty() || allowed_origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
}

/// Requests running longer than `timeout` are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the full application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let cors = setup_cors(&resources.config.allowed_origins);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(PatientRoutes::routes(resources.clone()))
        .merge(PlanRoutes::routes(resources.clone()))
        .merge(LlmRoutes::routes(resources.clone()))
        .merge(ProcurementRoutes::routes(resources))
        .layer(timeout_layer(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
}

/// Serve the API on an already-bound listener until ctrl-c
///
/// # Errors
///
/// Returns an error if the server fails while running
pub async fn serve(listener: TcpListener, resources: Arc<ServerResources>) -> Result<()> {
    let address = listener.local_addr().context("Listener has no local address")?;
    info!(%address, "WAVY nutrition API listening");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

/// Bind `host:port` from the configuration and serve
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let address = resources.config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    serve(listener, resources).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
