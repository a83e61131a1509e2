use super::{AppState, Result, WebError};
use crate::model::Thing;
use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_things(State(state): State<AppState>) -> Result<Json<Vec<Thing>>> {
    let things = state.service.get_things().await?;
    Ok(Json(things))
}

pub async fn get_thing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Thing>> {
    let thing = state
        .service
        .get_thing(id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("thing {id} not found")))?;
    Ok(Json(thing))
}

pub async fn validate_name(
    State(state): State<AppState>,
    Json(thing): Json<Thing>,
) -> Result<Json<bool>> {
    Ok(Json(state.service.validate_name(&thing).await?))
}

pub async fn validate(
    State(state): State<AppState>,
    Json(thing): Json<Thing>,
) -> Result<Json<bool>> {
    Ok(Json(state.service.validate(&thing).await?))
}

/// Responds with the stored Thing, or `null` when no row was written.
pub async fn save(
    State(state): State<AppState>,
    Json(thing): Json<Thing>,
) -> Result<Json<Option<Thing>>> {
    Ok(Json(state.service.save(thing).await?))
}

pub async fn remove(State(state): State<AppState>, Json(thing): Json<Thing>) -> Result<Json<u64>> {
    Ok(Json(state.service.remove(thing.id).await?))
}

pub async fn remove_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<u64>> {
    Ok(Json(state.service.remove(id).await?))
}
