// src/handlers/clients.rs

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
    common::filters::{ensure_known_keys, CLIENT_FILTER_KEYS},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{Client, ClientPayload},
    permissions::{authorize, Action, Entity},
};

// GET /crm/clients/
#[utoipa::path(
    get,
    path = "/crm/clients/",
    tag = "Clients",
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Client>),
        (status = 404, description = "Chave de filtro desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::Client, Action::List, &actor, None)?;
    ensure_known_keys(&params, CLIENT_FILTER_KEYS)?;

    let clients = app_state.client_service.list(&params).await?;
    Ok((StatusCode::OK, Json(clients)))
}

// GET /crm/clients/{id}/
#[utoipa::path(
    get,
    path = "/crm/clients/{id}/",
    tag = "Clients",
    responses(
        (status = 200, description = "Detalhe do cliente", body = Client),
        (status = 403, description = "Sem permissão sobre este cliente"),
        (status = 404, description = "Cliente não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn retrieve_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.get(id).await?;
    let ownership = app_state.client_service.ownership(&client).await?;
    authorize(Entity::Client, Action::Retrieve, &actor, Some(&ownership))?;

    Ok((StatusCode::OK, Json(client)))
}

// POST /crm/clients/
#[utoipa::path(
    post,
    path = "/crm/clients/",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::Client, Action::Create, &actor, None)?;
    payload.validate()?;

    let client = app_state.client_service.create(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /crm/clients/{id}/
#[utoipa::path(
    put,
    path = "/crm/clients/{id}/",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 403, description = "Sem permissão sobre este cliente"),
        (status = 404, description = "Cliente não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.client_service.get(id).await?;
    let ownership = app_state.client_service.ownership(&existing).await?;
    authorize(Entity::Client, Action::Update, &actor, Some(&ownership))?;
    payload.validate()?;

    let client = app_state
        .client_service
        .update(&actor, &existing, &payload)
        .await?;
    Ok((StatusCode::OK, Json(client)))
}

// DELETE /crm/clients/{id}/
#[utoipa::path(
    delete,
    path = "/crm/clients/{id}/",
    tag = "Clients",
    responses(
        (status = 204, description = "Cliente removido (contratos e eventos em cascata)"),
        (status = 404, description = "Cliente não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.client_service.get(id).await?;
    let ownership = app_state.client_service.ownership(&existing).await?;
    authorize(Entity::Client, Action::Delete, &actor, Some(&ownership))?;

    app_state.client_service.delete(&existing).await?;
    Ok(StatusCode::NO_CONTENT)
}
