use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Mapa campo -> mensagens, acumulado pelas regras de negócio.
/// BTreeMap para que a ordem dos campos na resposta seja estável.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MANAGEMENT_ONLY: &str =
    "Sorry, only members of the management team can perform this action";
pub const NO_PERMISSION: &str = "You do not have permission to perform this action.";
pub const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
pub const INVALID_TOKEN: &str = "Token is invalid or expired";
pub const UNKNOWN_FILTER: &str =
    "Sorry, looks like you search for inexistent fields. \
     Please ensure you correctly entered searched fields.";

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    Validation(#[from] validator::ValidationErrors),

    // Regras de negócio (passo objeto): campo -> mensagens
    #[error("Regras de negócio violadas")]
    Rules(FieldErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("Filtro de busca desconhecido")]
    UnknownFilter,

    // Guarda referencial: usuário ainda é contato de clientes/eventos
    #[error("Exclusão bloqueada: {0}")]
    DeleteBlocked(String),

    #[error("Erro de banco de dados")]
    Database(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// 404 com a mensagem padrão da API ("Sorry, client 0 doesn't exist").
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("Sorry, {entity} {id} doesn't exist"))
    }

    /// Erro de regra em um único campo.
    pub fn rule(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Rules(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Erros de campo viram o próprio mapa campo -> [mensagens],
            // como o resto da API espera ler.
            AppError::Validation(errors) => {
                let mut details = FieldErrors::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (StatusCode::BAD_REQUEST, json!(details))
            }
            AppError::Rules(details) => (StatusCode::BAD_REQUEST, json!(details)),

            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": INVALID_CREDENTIALS }))
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": INVALID_TOKEN }))
            }
            AppError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, json!({ "detail": message }))
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, json!({ "detail": message }))
            }
            AppError::UnknownFilter => {
                (StatusCode::NOT_FOUND, json!({ "detail": UNKNOWN_FILTER }))
            }
            AppError::DeleteBlocked(message) => {
                (StatusCode::BAD_REQUEST, json!({ "Unauthorized delete": message }))
            }

            // Todos os outros erros (Database, Bcrypt, Jwt, Internal) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
