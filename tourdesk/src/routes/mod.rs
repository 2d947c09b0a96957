//! Route assembly
//!
//! Resource routers mount under `/api/v1`; the health probe sits at the
//! root. The diagnostics middleware wraps every route so development error
//! responses pick up their `detail` field.

mod reviews;
mod tours;
mod users;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::error::error_diagnostics;
use crate::health::health;
use crate::state::AppState;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/tours", tours::router())
        .nest("/api/v1/users", users::router())
        .nest("/api/v1/reviews", reviews::router())
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_diagnostics,
        ))
        .with_state(state)
}
