//! API Routes
//!
//! Configures the Axum router for the redirect gateway.

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use super::handlers::{redirect_handler, AppState};
use crate::error::GatewayError;

/// Creates the router; every path goes to [`redirect_handler`].
///
/// # Middleware
/// - Catch panic: a panicking handler answers 500 `Internal error`
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    with_middleware(Router::new().fallback(redirect_handler)).with_state(state)
}

fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    error!("Handler panicked: {}", detail);
    GatewayError::Internal(detail).into_response()
}
