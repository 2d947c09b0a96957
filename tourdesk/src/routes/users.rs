//! User routes

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::resources::User;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list::<User>).post(handlers::create::<User>),
        )
        .route(
            "/{id}",
            get(handlers::get_one::<User>)
                .patch(handlers::update::<User>)
                .delete(handlers::delete_one::<User>),
        )
}
