//! # userdesk-api — Axum API Service for Userdesk
//!
//! HTTP surface for self-service user operations. Requests are
//! authenticated into a session identity, authorized and translated into
//! commands by `userdesk-core`, and handed to the configured
//! [`CommandDispatcher`](userdesk_core::CommandDispatcher).
//!
//! ## API Surface
//!
//! | Route                        | Auth   | Module                 |
//! |------------------------------|--------|------------------------|
//! | `POST /users/{uuid}/email`   | Bearer | [`routes::users`]      |
//! | `GET /openapi.json`          | none   | [`openapi`]            |
//! | `GET /metrics`               | none   | [`middleware::metrics`] |
//! | `GET /health/*`              | none   | this module            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware (user routes only) → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

pub use error::AppError;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes, `/metrics` and `/openapi.json` are mounted outside the
/// auth middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        secret: state.config.auth_secret.clone(),
    };

    let api = Router::new()
        .merge(routes::users::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    let public = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(middleware::metrics::render_metrics));

    Router::new()
        .merge(public)
        .merge(api)
        .with_state(state)
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
