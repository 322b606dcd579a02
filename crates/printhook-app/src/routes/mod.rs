// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP routes.

pub mod health;
pub mod print;
pub mod printers;

use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::services::ServiceContext;

/// Build the service router.
pub fn router(ctx: ServiceContext) -> Router {
    Router::new()
        .route("/api/print", post(print::print_document))
        .route("/api/printers", get(printers::list_printers))
        .route("/api/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(ctx)
}

/// Backstop for failures nothing else caught.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown failure".to_string()
    };
    ApiError::Server(detail).into_response()
}
