use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    error::ApiError,
    models::User,
    session::SESSION_NAME,
    state::AppState,
};

/// The user resolved from the session cookie, stored as a request extension
/// by [`authenticate_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Guards the private routes. A session that cannot be decoded is a 500;
/// a session without a user, or for a user that no longer exists, is a 401.
pub async fn authenticate_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = state.sessions.get(req.headers(), SESSION_NAME)?;

    let Some(user_id) = session.user_id() else {
        debug!("session has no user_id");
        return Err(ApiError::NotAuthenticated);
    };

    let user = state.store.user().find_by_id(user_id).await.map_err(|e| {
        warn!(error = %e, user_id, "session references unknown user");
        ApiError::NotAuthenticated
    })?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::NotAuthenticated)
    }
}
