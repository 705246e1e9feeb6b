// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, TokenKind, TokenPairResponse, User},
};

const ACCESS_TTL_MINUTES: i64 = 60;
const REFRESH_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    /// Falha de login é sempre a mesma mensagem genérica: nunca revela se
    /// foi o username ou a senha que errou.
    pub async fn login_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPairResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(TokenPairResponse {
            access: self.create_token(user.id, TokenKind::Access)?,
            refresh: self.create_token(user.id, TokenKind::Refresh)?,
        })
    }

    /// Valida o token de acesso do cabeçalho Authorization e carrega o
    /// usuário correspondente (leitura fresca: papel e posse valem do
    /// momento da requisição).
    pub async fn validate_access_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::InvalidToken);
        }
        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Troca um refresh token válido por um novo token de acesso.
    pub async fn refresh_access_token(&self, refresh: &str) -> Result<String, AppError> {
        let claims = self.decode_token(refresh)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AppError::InvalidToken);
        }
        // O usuário pode ter sido removido desde a emissão
        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;
        self.create_token(user.id, TokenKind::Access)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = match kind {
            TokenKind::Access => now + chrono::Duration::minutes(ACCESS_TTL_MINUTES),
            TokenKind::Refresh => now + chrono::Duration::days(REFRESH_TTL_DAYS),
        };

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
            kind,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
