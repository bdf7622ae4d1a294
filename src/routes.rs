use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{NewAppearance, ValidationError},
    serialize::{FLAT, Rules, to_value},
};

pub async fn list_episodes(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Value>>> {
    let flat = Rules::new(FLAT.iter().copied());
    let episodes = state.repo.list_episodes().await?;
    Ok(Json(episodes.iter().map(|e| to_value(e, &flat)).collect()))
}

pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Value>> {
    let id = path_id(id, "Episode")?;
    let episode = state.repo.find_episode(id).await?.ok_or(AppError::NotFound("Episode"))?;
    Ok(Json(to_value(&episode, &Rules::none())))
}

pub async fn delete_episode(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_id(id, "Episode")?;
    if !state.repo.delete_episode(id).await? {
        return Err(AppError::NotFound("Episode"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_guests(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Value>>> {
    let flat = Rules::new(FLAT.iter().copied());
    let guests = state.repo.list_guests().await?;
    Ok(Json(guests.iter().map(|g| to_value(g, &flat)).collect()))
}

pub async fn delete_guest(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_id(id, "Guest")?;
    if !state.repo.delete_guest(id).await? {
        return Err(AppError::NotFound("Guest"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_appearance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewAppearance>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(new) = payload.map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
    let appearance = state.repo.create_appearance(new).await?;
    Ok((StatusCode::CREATED, Json(to_value(&appearance, &Rules::none()))))
}

/// Ids that cannot name a row (not numeric, out of range) are reported the
/// same way as ids that simply do not exist.
fn path_id(id: Result<Path<i32>, PathRejection>, entity: &'static str) -> AppResult<i32> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(err) => {
            tracing::debug!(error = %err.body_text(), entity, "unparseable id");
            Err(AppError::NotFound(entity))
        },
    }
}
