use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};

use super::dto::CredentialsRequest;
use crate::{error::ApiError, middleware::CurrentUser, models::User, state::AppState};

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(req) = payload?;

    let mut user = User::new(req.email, req.password);
    if let Err(e) = state.store.user().create(&mut user).await {
        warn!(error = %e, email = %user.email, "create user failed");
        return Err(e.into());
    }

    user.sanitize();
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip_all)]
pub async fn whoami(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
