//! Review routes
//!
//! Reviews mount twice: standalone at `/api/v1/reviews` and nested under a
//! tour at `/api/v1/tours/{tour_id}/reviews`. The handlers are the same;
//! the nested form picks the parent id out of the path through the
//! resource's parent scope.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::resources::Review;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list::<Review>).post(handlers::create::<Review>),
        )
        .route(
            "/{id}",
            get(handlers::get_one::<Review>)
                .patch(handlers::update::<Review>)
                .delete(handlers::delete_one::<Review>),
        )
}

/// The form mounted under `/tours/{tour_id}/reviews`
pub fn nested_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list::<Review>).post(handlers::create::<Review>),
    )
}
