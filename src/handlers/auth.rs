// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AccessResponse, LoginPayload, RefreshPayload, TokenPairResponse},
};

// Handler de login: devolve o par access/refresh
#[utoipa::path(
    post,
    path = "/crm/login/",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Par de tokens emitido", body = TokenPairResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<TokenPairResponse>, AppError> {
    payload.validate()?;

    let tokens = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await?;

    Ok(Json(tokens))
}

// Troca um refresh token válido por um novo token de acesso
#[utoipa::path(
    post,
    path = "/crm/token/refresh/",
    tag = "Auth",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "Novo token de acesso", body = AccessResponse),
        (status = 401, description = "Refresh token inválido ou expirado")
    )
)]
pub async fn refresh_token(
    State(app_state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<AccessResponse>, AppError> {
    let access = app_state
        .auth_service
        .refresh_access_token(&payload.refresh)
        .await?;

    Ok(Json(AccessResponse { access }))
}
