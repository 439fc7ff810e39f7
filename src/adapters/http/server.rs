//! Router, handlers and server loop

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::{ApiResponse, ProxyService};

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build the application router
pub fn build_router(service: Arc<ProxyService>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", get(dispatch).options(preflight))
        .route("/api/solboy", get(dispatch).options(preflight))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve until `shutdown` resolves
pub async fn run_server<F>(service: Arc<ProxyService>, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind http server on {}", addr))?;
    tracing::info!(bind = %addr, "http server started");

    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")?;

    tracing::info!("http server stopped");
    Ok(())
}

async fn dispatch(
    State(service): State<Arc<ProxyService>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResponse {
    service.handle(&params).await
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
