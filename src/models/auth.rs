// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE team do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "team", rename_all = "UPPERCASE")]
pub enum Team {
    Management,
    Sales,
    Support,
}

impl Team {
    /// Parse do rótulo da API ("Management", "Sales", "Support"); a
    /// validação do rótulo acontece antes, em `is_valid_team`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Management" => Some(Team::Management),
            "Sales" => Some(Team::Sales),
            "Support" => Some(Team::Support),
            _ => None,
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub team: Team,
    // is_staff é derivado: verdadeiro sse team == Management
    pub is_staff: bool,
    pub is_superuser: bool,

    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl User {
    pub fn is_management(&self) -> bool {
        self.team == Team::Management
    }

    pub fn is_sales(&self) -> bool {
        self.team == Team::Sales
    }

    pub fn is_support(&self) -> bool {
        self.team == Team::Support
    }
}

// Dados para registro de um novo usuário (somente Management)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "james")]
    pub first_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "bond")]
    pub last_name: String,

    #[schema(example = "toto1234")]
    pub password1: String,
    #[schema(example = "toto1234")]
    pub password2: String,

    #[schema(example = "Support")]
    pub team: String,

    // Só o console de administração mexe nisso; ausente = false
    #[serde(default)]
    pub is_superuser: bool,
}

// Dados para atualização de perfil
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub last_name: String,

    // Vazias = senha inalterada; exatamente uma preenchida = erro
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,

    pub team: String,

    // Ausente = preserva o valor armazenado
    pub is_superuser: Option<bool>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "jbond")]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "toto1234")]
    pub password: String,
}

// Resposta de autenticação com o par de tokens
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshPayload {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub exp: usize,     // Expiration time (quando o token expira)
    pub iat: usize,     // Issued At (quando o token foi criado)
    pub kind: TokenKind,
}
