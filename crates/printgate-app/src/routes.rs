// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP surface.
//
//   POST /api/execute   → Dispatcher::execute
//   POST /api/shutdown  → 202, then cancel the shutdown token
//   GET  /health        → { "ok": true }
//
// Every route is restricted to loopback peers.  `/api/*` additionally needs
// a bearer token shaped like a JWT unless authentication is disabled.

use std::any::Any;
use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use printgate_core::types::{ActionRequest, ActionResult};
use printgate_security::{BearerError, validate_authorization};

use crate::shutdown;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/execute", post(execute))
        .route("/api/shutdown", post(request_shutdown))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .merge(api)
        .route("/health", get(health))
        .layer(middleware::from_fn(loopback_only))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn execute(
    State(state): State<AppState>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "rejected request body");
            return action_response(ActionResult::fail(400, "bad_request"));
        }
    };
    action_response(state.dispatcher.execute(request).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn request_shutdown(State(state): State<AppState>) -> Response {
    shutdown::cancel_after(state.shutdown.clone(), state.shutdown_grace);
    (
        StatusCode::ACCEPTED,
        Json(json!({ "ok": true, "message": "received_shutdown" })),
    )
        .into_response()
}

fn action_response(result: ActionResult) -> Response {
    let status =
        StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result)).into_response()
}

async fn loopback_only(request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    match peer {
        Some(addr) if addr.ip().is_loopback() => next.run(request).await,
        other => {
            warn!(peer = ?other, path = %request.uri().path(), "non-loopback caller rejected");
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "forbidden_non_localhost" })),
            )
                .into_response()
        }
    }
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.require_bearer {
        return next.run(request).await;
    }

    let checked = match request.headers().get(AUTHORIZATION) {
        None => validate_authorization(None).map(|_| ()),
        Some(value) => match value.to_str() {
            Ok(header) => validate_authorization(Some(header)).map(|_| ()),
            Err(_) => Err(BearerError::NotBearer),
        },
    };

    match checked {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!(reason = %e, path = %request.uri().path(), "unauthorised request");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    error!(panic = %detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal_error" })),
    )
        .into_response()
}
