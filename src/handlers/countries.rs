use axum::extract::State;
use axum::Json;

use super::Message;
use crate::app::AppState;
use crate::country::CountryInput;
use crate::entity::country;
use crate::error::Result;
use crate::extract::{ValidJson, ValidPath};

pub async fn list_countries(State(state): State<AppState>) -> Result<Json<Vec<country::Model>>> {
    Ok(Json(state.countries.list().await?))
}

pub async fn create_country(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CountryInput>,
) -> Result<Json<country::Model>> {
    Ok(Json(state.countries.create(input).await?))
}

pub async fn get_country(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<country::Model>> {
    Ok(Json(state.countries.get(id).await?))
}

pub async fn update_country(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(input): ValidJson<CountryInput>,
) -> Result<Json<country::Model>> {
    Ok(Json(state.countries.update(id, input).await?))
}

pub async fn delete_country(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Message>> {
    state.countries.delete(id).await?;
    Ok(Json(Message::new("Country deleted successfully")))
}
