use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;

use super::{UserStore, NOT_AUTHENTICATED, USER_ID_KEY};
use crate::app::AppState;
use crate::entity::user;
use crate::error::{Error, Result};

/// Resolves the session's `user_id` to a stored user.
///
/// `None` when the session carries no id or the id no longer matches a user.
pub async fn current_user(session: &Session, users: &UserStore) -> Result<Option<user::Model>> {
    let Some(user_id) = session.get::<i32>(USER_ID_KEY).await? else {
        return Ok(None);
    };
    users.find_by_id(user_id).await
}

/// Extractor flavour of [`current_user`] for handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<user::Model>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        current_user(&session, &state.users)
            .await
            .map(CurrentUser)
            .map_err(IntoResponse::into_response)
    }
}

/// Middleware rejecting anonymous requests with 401.
pub async fn require_login(
    CurrentUser(user): CurrentUser,
    request: Request,
    next: Next,
) -> Result<Response> {
    if user.is_none() {
        return Err(Error::Unauthorized(NOT_AUTHENTICATED));
    }
    Ok(next.run(request).await)
}
