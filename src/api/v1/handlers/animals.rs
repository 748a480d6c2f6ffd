/*
 * Responsibility
 * - /animals CRUD handlers
 * - AuthCtx is taken explicitly and role-gated (USER or ADMIN) before anything else
 * - DTO validation -> AnimalService -> AppError mapping
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
};

use crate::{
    api::v1::{
        dto::animals::{AnimalResponse, CreateAnimalRequest, UpdateAnimalRequest},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    services::auth::Role,
    state::AppState,
};

const ANIMAL_ROLES: &[Role] = &[Role::User, Role::Admin];

fn to_responses(rows: Vec<crate::repos::AnimalRow>) -> Vec<AnimalResponse> {
    rows.into_iter().map(AnimalResponse::from).collect()
}

pub async fn create_animal(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    headers: HeaderMap,
    payload: Result<Json<CreateAnimalRequest>, JsonRejection>,
) -> Result<Json<AnimalResponse>, AppError> {
    ctx.require_any(ANIMAL_ROLES)?;
    let Json(req) = payload?;
    req.validate().map_err(AppError::validation)?;

    // Forwarded verbatim to the stable registry.
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let row = state
        .animals
        .create(&ctx.username, req.fields(), req.stable_id, authorization)
        .await?;

    Ok(Json(row.into()))
}

pub async fn get_animal(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    animal_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AnimalResponse>, AppError> {
    ctx.require_any(ANIMAL_ROLES)?;
    let Path(animal_id) = animal_id?;

    let row = state
        .animals
        .get(animal_id, &ctx.username, ctx.is_admin())
        .await?;

    Ok(Json(row.into()))
}

pub async fn list_animals(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<AnimalResponse>>, AppError> {
    ctx.require_any(ANIMAL_ROLES)?;

    let rows = state.animals.list(&ctx.username, ctx.is_admin()).await?;

    Ok(Json(to_responses(rows)))
}

pub async fn list_animals_by_stable(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    stable_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<AnimalResponse>>, AppError> {
    ctx.require_any(ANIMAL_ROLES)?;
    let Path(stable_id) = stable_id?;

    let rows = state
        .animals
        .list_by_stable(stable_id, &ctx.username, ctx.is_admin())
        .await?;
    tracing::debug!(stable_id, count = rows.len(), "animals by stable");

    Ok(Json(to_responses(rows)))
}

pub async fn update_animal(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    animal_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateAnimalRequest>, JsonRejection>,
) -> Result<Json<AnimalResponse>, AppError> {
    ctx.require_any(ANIMAL_ROLES)?;
    let Path(animal_id) = animal_id?;
    let Json(req) = payload?;
    req.validate().map_err(AppError::validation)?;

    let row = state
        .animals
        .update(
            animal_id,
            &ctx.username,
            ctx.is_admin(),
            req.fields(),
            req.owner_username.as_deref(),
        )
        .await?;

    Ok(Json(row.into()))
}

pub async fn delete_animal(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    animal_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    ctx.require_any(ANIMAL_ROLES)?;
    let Path(animal_id) = animal_id?;

    state
        .animals
        .delete(animal_id, &ctx.username, ctx.is_admin())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
