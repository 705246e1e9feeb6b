// src/handlers/events.rs

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
    common::filters::{ensure_known_keys, EVENT_FILTER_KEYS},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{Event, EventPayload},
    permissions::{authorize, Action, Entity},
};

// GET /crm/events/
#[utoipa::path(
    get,
    path = "/crm/events/",
    tag = "Events",
    responses(
        (status = 200, description = "Lista de eventos", body = Vec<Event>),
        (status = 404, description = "Chave de filtro desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::Event, Action::List, &actor, None)?;
    ensure_known_keys(&params, EVENT_FILTER_KEYS)?;

    let events = app_state.event_service.list(&params).await?;
    Ok((StatusCode::OK, Json(events)))
}

// GET /crm/events/{id}/
#[utoipa::path(
    get,
    path = "/crm/events/{id}/",
    tag = "Events",
    responses(
        (status = 200, description = "Detalhe do evento", body = Event),
        (status = 403, description = "Sem permissão sobre este evento"),
        (status = 404, description = "Evento não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn retrieve_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.event_service.get(id).await?;
    let ownership = app_state.event_service.ownership(&detail);
    authorize(Entity::Event, Action::Retrieve, &actor, Some(&ownership))?;

    Ok((StatusCode::OK, Json(detail.event)))
}

// POST /crm/events/
#[utoipa::path(
    post,
    path = "/crm/events/",
    tag = "Events",
    request_body = EventPayload,
    responses(
        (status = 201, description = "Evento criado", body = Event),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<EventPayload>,
) -> Result<impl IntoResponse, AppError> {
    authorize(Entity::Event, Action::Create, &actor, None)?;
    payload.validate()?;

    let event = app_state.event_service.create(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// PUT /crm/events/{id}/
#[utoipa::path(
    put,
    path = "/crm/events/{id}/",
    tag = "Events",
    request_body = EventPayload,
    responses(
        (status = 200, description = "Evento atualizado", body = Event),
        (status = 403, description = "Sem permissão sobre este evento"),
        (status = 404, description = "Evento não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventPayload>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.event_service.get(id).await?;
    let ownership = app_state.event_service.ownership(&existing);
    authorize(Entity::Event, Action::Update, &actor, Some(&ownership))?;
    payload.validate()?;

    let event = app_state
        .event_service
        .update(&actor, &existing, &payload)
        .await?;
    Ok((StatusCode::OK, Json(event)))
}

// DELETE /crm/events/{id}/
#[utoipa::path(
    delete,
    path = "/crm/events/{id}/",
    tag = "Events",
    responses(
        (status = 204, description = "Evento removido"),
        (status = 404, description = "Evento não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let existing = app_state.event_service.get(id).await?;
    let ownership = app_state.event_service.ownership(&existing);
    authorize(Entity::Event, Action::Delete, &actor, Some(&ownership))?;

    app_state.event_service.delete(&existing).await?;
    Ok(StatusCode::NO_CONTENT)
}
