use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{middleware::authenticate_user, state::AppState};

mod dto;
pub mod sessions;
pub mod users;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/sessions", post(sessions::create_session))
}

/// Everything under `/private` requires a logged-in session.
pub fn private_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/whoami", get(users::whoami))
        .route_layer(middleware::from_fn_with_state(state, authenticate_user))
}
