//! Luxe Decor back-office library.
//!
//! The admin panel as a library: the binary in `main.rs` only loads
//! configuration, installs tracing and serves [`app`].
//!
//! # Security
//!
//! Every page except sign-in requires a session whose user holds the
//! `ADMIN` role (or the configured first-admin phone). The bearer token in
//! that session can moderate content, ban users and edit the catalog.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::{Request, State},
    http::{Response, StatusCode},
    routing::get,
};
use luxe_client::CollectionQuery;
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::session::SessionKeyError;
use crate::state::AppState;

/// Stylesheet served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the admin router with every middleware layer applied.
///
/// # Errors
///
/// Returns an error if the session signing key cannot be derived.
pub fn app(state: AppState) -> Result<Router, SessionKeyError> {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ))
        .with_state(state.clone());

    let router = middleware::with_session_layer(routes, state.config())?
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        );

    Ok(router)
}

/// Liveness check. Does not touch the backend.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: the backend must answer a one-item collection list.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let query = CollectionQuery {
        limit: Some(1),
        ..Default::default()
    };
    match state.api().anonymous().list_collections(&query).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
