// src/handlers/users.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::filters::{ensure_known_keys, USER_FILTER_KEYS},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{RegisterUserPayload, UpdateUserPayload, User},
    permissions::{authorize, Action, Entity},
};

// GET /crm/users/
#[utoipa::path(
    get,
    path = "/crm/users/",
    tag = "Users",
    responses(
        (status = 200, description = "Lista de usuários", body = Vec<User>),
        (status = 403, description = "Restrito ao time de gestão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::User, Action::List, &actor, None)?;
    ensure_known_keys(&params, USER_FILTER_KEYS)?;

    let users = app_state.user_service.list(&params).await?;
    Ok((StatusCode::OK, Json(users)))
}

// GET /crm/users/{id}/
#[utoipa::path(
    get,
    path = "/crm/users/{id}/",
    tag = "Users",
    responses(
        (status = 200, description = "Detalhe do usuário", body = User),
        (status = 404, description = "Usuário não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn retrieve_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get(id).await?;
    authorize(Entity::User, Action::Retrieve, &actor, None)?;

    Ok((StatusCode::OK, Json(user)))
}

// POST /crm/users/ (cadastro, restrito à gestão)
#[utoipa::path(
    post,
    path = "/crm/users/",
    tag = "Users",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::User, Action::Create, &actor, None)?;
    payload.validate()?;

    let user = app_state.user_service.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /crm/users/{id}/
#[utoipa::path(
    put,
    path = "/crm/users/{id}/",
    tag = "Users",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Usuário não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.user_service.get(id).await?;
    authorize(Entity::User, Action::Update, &actor, None)?;
    payload.validate()?;

    let user = app_state.user_service.update(&existing, &payload).await?;
    Ok((StatusCode::OK, Json(user)))
}

// DELETE /crm/users/{id}/
#[utoipa::path(
    delete,
    path = "/crm/users/{id}/",
    tag = "Users",
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 400, description = "Usuário ainda é contato de clientes/eventos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.user_service.get(id).await?;
    authorize(Entity::User, Action::Delete, &actor, None)?;

    app_state.user_service.delete(&existing).await?;
    Ok(StatusCode::NO_CONTENT)
}
