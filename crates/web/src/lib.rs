//! Talent Hub front-end library.
//!
//! Server-rendered pages for the Talent Hub marketplace. Authentication,
//! listings, and hires live in a remote API; this crate owns the browser
//! session (a bearer token in the `session` cookie), gates routes on it, and
//! renders pages.
//!
//! The binary in `main.rs` adds Sentry and serves [`app`]; tests drive
//! [`app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{Router, http::Request, response::Response};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use config::WebConfig;
pub use state::AppState;

/// Build the application router.
///
/// Page routes run behind the route guard; the health probe and stylesheet
/// do not.
pub fn app(state: AppState) -> Router {
    let pages = routes::routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::route_guard,
    ));

    Router::new()
        .merge(pages)
        .merge(routes::asset_routes())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
