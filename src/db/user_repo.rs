// src/db/user_repo.rs

use std::collections::{HashMap, HashSet};

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Team, User},
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, username, password_hash, team, is_staff, is_superuser, \
     date_created, date_updated";

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    /// Usernames já em uso, para a geração com desvio de colisão. Em
    /// atualizações o próprio usuário é excluído do conjunto.
    pub async fn taken_usernames(
        &self,
        exclude: Option<Uuid>,
    ) -> Result<HashSet<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT username FROM users WHERE id IS DISTINCT FROM $1",
        )
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(username,)| username).collect())
    }

    pub async fn list(&self, filters: &HashMap<String, String>) -> Result<Vec<User>, AppError> {
        let mut query = sqlx::QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
        ));
        if let Some(username) = filters.get("username") {
            query.push(" AND username = ").push_bind(username);
        }
        if let Some(last_name) = filters.get("last_name") {
            query.push(" AND last_name = ").push_bind(last_name);
        }
        query.push(" ORDER BY username ASC");
        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn any_user_exists(&self) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        first_name: &str,
        last_name: &str,
        username: &str,
        password_hash: &str,
        team: Team,
        is_superuser: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, username, password_hash, team, \
             is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(username)
        .bind(password_hash)
        .bind(team)
        .bind(team == Team::Management)
        .bind(is_superuser)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // A unicidade do username é garantida pelo índice; a geração
            // pode perder a corrida entre a pré-checagem e o commit.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::rule("username", "This username is already taken.");
                }
            }
            e.into()
        })?;
        Ok(user)
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        username: &str,
        password_hash: Option<&str>,
        team: Team,
        is_superuser: bool,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET first_name = $2, last_name = $3, username = $4, \
             password_hash = COALESCE($5, password_hash), team = $6, is_staff = $7, \
             is_superuser = $8, date_updated = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(username)
        .bind(password_hash)
        .bind(team)
        .bind(team == Team::Management)
        .bind(is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::rule("username", "This username is already taken.");
                }
            }
            e.into()
        })?;
        Ok(user)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
