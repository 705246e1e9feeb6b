// src/handlers/contracts.rs

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
    common::filters::{ensure_known_keys, CONTRACT_FILTER_KEYS},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{ContractDetail, ContractPayload},
    permissions::{authorize, Action, Entity},
};

// GET /crm/contracts/
#[utoipa::path(
    get,
    path = "/crm/contracts/",
    tag = "Contracts",
    responses(
        (status = 200, description = "Lista de contratos", body = Vec<ContractDetail>),
        (status = 404, description = "Chave de filtro desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::Contract, Action::List, &actor, None)?;
    ensure_known_keys(&params, CONTRACT_FILTER_KEYS)?;

    let contracts = app_state.contract_service.list(&params).await?;
    Ok((StatusCode::OK, Json(contracts)))
}

// GET /crm/contracts/{id}/
#[utoipa::path(
    get,
    path = "/crm/contracts/{id}/",
    tag = "Contracts",
    responses(
        (status = 200, description = "Detalhe do contrato", body = ContractDetail),
        (status = 403, description = "Sem permissão sobre este contrato"),
        (status = 404, description = "Contrato não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn retrieve_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state.contract_service.get(id).await?;
    let ownership = app_state.contract_service.ownership(&contract);
    authorize(Entity::Contract, Action::Retrieve, &actor, Some(&ownership))?;

    Ok((StatusCode::OK, Json(contract)))
}

// POST /crm/contracts/
#[utoipa::path(
    post,
    path = "/crm/contracts/",
    tag = "Contracts",
    request_body = ContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = ContractDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<ContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::Contract, Action::Create, &actor, None)?;
    payload.validate()?;

    let contract = app_state.contract_service.create(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

// PUT /crm/contracts/{id}/
#[utoipa::path(
    put,
    path = "/crm/contracts/{id}/",
    tag = "Contracts",
    request_body = ContractPayload,
    responses(
        (status = 200, description = "Contrato atualizado", body = ContractDetail),
        (status = 403, description = "Sem permissão sobre este contrato"),
        (status = 404, description = "Contrato não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.contract_service.get(id).await?;
    let ownership = app_state.contract_service.ownership(&existing);
    authorize(Entity::Contract, Action::Update, &actor, Some(&ownership))?;
    payload.validate()?;

    let contract = app_state
        .contract_service
        .update(&actor, &existing, &payload)
        .await?;
    Ok((StatusCode::OK, Json(contract)))
}

// DELETE /crm/contracts/{id}/
#[utoipa::path(
    delete,
    path = "/crm/contracts/{id}/",
    tag = "Contracts",
    responses(
        (status = 204, description = "Contrato removido (evento em cascata)"),
        (status = 404, description = "Contrato não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.contract_service.get(id).await?;
    let ownership = app_state.contract_service.ownership(&existing);
    authorize(Entity::Contract, Action::Delete, &actor, Some(&ownership))?;

    app_state.contract_service.delete(&existing).await?;
    Ok(StatusCode::NO_CONTENT)
}
