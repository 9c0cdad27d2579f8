use axum::extract::State;
use axum::Json;
use tower_sessions::Session;

use super::Message;
use crate::app::AppState;
use crate::auth::{self, Credentials, CurrentUser, UserResponse, NOT_AUTHENTICATED};
use crate::error::{Error, Result};
use crate::extract::ValidJson;

pub async fn signup(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Result<Json<UserResponse>> {
    let user = state.users.signup(credentials).await?;
    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Result<Json<Message>> {
    let user = state.users.authenticate(credentials).await?;
    auth::log_in(&session, &user).await?;
    Ok(Json(Message::new("Logged in")))
}

pub async fn logout(session: Session) -> Result<Json<Message>> {
    auth::log_out(&session).await?;
    Ok(Json(Message::new("Logged out")))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Result<Json<UserResponse>> {
    user.map(|u| Json(u.into()))
        .ok_or(Error::Unauthorized(NOT_AUTHENTICATED))
}
