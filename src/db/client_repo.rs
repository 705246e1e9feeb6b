// src/db/client_repo.rs

use std::collections::HashMap;

use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::crm::Client};

const CLIENT_COLUMNS: &str =
    "id, first_name, last_name, email, phone, mobile, company_name, sales_contact, \
     date_created, date_updated";

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let maybe_client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_client)
    }

    pub async fn list(
        &self,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Client>, AppError> {
        let mut query = sqlx::QueryBuilder::<Postgres>::new(format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE 1=1"
        ));
        if let Some(last_name) = filters.get("last_name") {
            query.push(" AND last_name = ").push_bind(last_name);
        }
        if let Some(email) = filters.get("email") {
            query.push(" AND email = ").push_bind(email);
        }
        if let Some(company_name) = filters.get("company_name") {
            query.push(" AND company_name = ").push_bind(company_name);
        }
        query.push(" ORDER BY date_created ASC");
        let clients = query
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    /// Contatos de suporte dos eventos pendurados nos contratos deste
    /// cliente (predicado IsClientEventSupportContact).
    pub async fn event_support_contacts(&self, client_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT e.support_contact \
             FROM events e \
             JOIN contracts c ON e.contract = c.id \
             WHERE c.client = $1 AND e.support_contact IS NOT NULL",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Nomes ("First Last") dos clientes cujo contato de vendas é o
    /// usuário, para a mensagem da guarda de exclusão.
    pub async fn names_by_sales_contact(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT first_name, last_name FROM clients \
             WHERE sales_contact = $1 ORDER BY date_created ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(first, last)| format!("{first} {last}"))
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        mobile: &str,
        company_name: &str,
        sales_contact: Uuid,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients (first_name, last_name, email, phone, mobile, \
             company_name, sales_contact) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(phone)
        .bind(mobile)
        .bind(company_name)
        .bind(sales_contact)
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        mobile: &str,
        company_name: &str,
        sales_contact: Uuid,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients SET first_name = $2, last_name = $3, email = $4, phone = $5, \
             mobile = $6, company_name = $7, sales_contact = $8, date_updated = NOW() \
             WHERE id = $1 \
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(phone)
        .bind(mobile)
        .bind(company_name)
        .bind(sales_contact)
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        // Contratos e eventos caem junto via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
