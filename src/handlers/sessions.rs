use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument, warn};

use super::dto::CredentialsRequest;
use crate::{error::ApiError, session::SESSION_NAME, state::AppState};

/// Logs a user in by setting `user_id` in the session cookie. Unknown email
/// and wrong password get the same 401.
#[instrument(skip(state, headers, payload))]
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let Json(req) = payload?;

    let user = match state.store.user().find_by_email(&req.email).await {
        Ok(u) if u.compare_passwords(&req.password) => u,
        Ok(u) => {
            warn!(user_id = u.id, "login invalid password");
            return Err(ApiError::IncorrectEmailOrPassword);
        }
        Err(e) => {
            warn!(error = %e, email = %req.email, "login lookup failed");
            return Err(ApiError::IncorrectEmailOrPassword);
        }
    };

    let mut session = state.sessions.get(&headers, SESSION_NAME)?;
    session.set_user_id(user.id);

    let mut response_headers = HeaderMap::new();
    state.sessions.save(&session, &mut response_headers)?;

    info!(user_id = user.id, "user logged in");
    Ok((StatusCode::OK, response_headers))
}
