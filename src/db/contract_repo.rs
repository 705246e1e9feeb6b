// src/db/contract_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{AppError, FieldErrors},
    common::filters::{parse_date_param, parse_float_param},
    models::crm::{Contract, ContractDetail},
};

const CONTRACT_COLUMNS: &str =
    "id, client, status, amount, payment_due, date_created, date_updated";

// Colunas do contrato + contato de vendas derivado do cliente
const DETAIL_COLUMNS: &str =
    "co.id, co.client, cl.sales_contact, co.status, co.amount, co.payment_due, \
     co.date_created, co.date_updated";

#[derive(Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_detail_by_id(&self, id: Uuid) -> Result<Option<ContractDetail>, AppError> {
        let maybe_contract = sqlx::query_as::<_, ContractDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM contracts co \
             JOIN clients cl ON co.client = cl.id \
             WHERE co.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_contract)
    }

    pub async fn list(
        &self,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<ContractDetail>, AppError> {
        // Valores tipados primeiro: um filtro malformado rejeita a busca
        // inteira antes de tocar no banco
        let mut errors = FieldErrors::new();
        let payment_due = parse_date_param(filters, "payment_due", &mut errors);
        let payment_due_after = parse_date_param(filters, "payment_due_after", &mut errors);
        let payment_due_before = parse_date_param(filters, "payment_due_before", &mut errors);
        let amount = parse_float_param(filters, "amount", &mut errors);
        let amount_gt = parse_float_param(filters, "amount_gt", &mut errors);
        let amount_lt = parse_float_param(filters, "amount_lt", &mut errors);
        if !errors.is_empty() {
            return Err(AppError::Rules(errors));
        }

        let mut query = sqlx::QueryBuilder::<Postgres>::new(format!(
            "SELECT {DETAIL_COLUMNS} FROM contracts co \
             JOIN clients cl ON co.client = cl.id WHERE 1=1"
        ));
        if let Some(last_name) = filters.get("last_name") {
            query.push(" AND cl.last_name = ").push_bind(last_name);
        }
        if let Some(email) = filters.get("email") {
            query.push(" AND cl.email = ").push_bind(email);
        }
        push_date_filter(&mut query, "co.payment_due", "=", payment_due);
        push_date_filter(&mut query, "co.payment_due", ">", payment_due_after);
        push_date_filter(&mut query, "co.payment_due", "<", payment_due_before);
        push_amount_filter(&mut query, "=", amount);
        push_amount_filter(&mut query, ">", amount_gt);
        push_amount_filter(&mut query, "<", amount_lt);
        query.push(" ORDER BY co.date_created ASC");

        let contracts = query
            .build_query_as::<ContractDetail>()
            .fetch_all(&self.pool)
            .await?;
        Ok(contracts)
    }

    /// Pré-checagem do invariante "um evento por contrato"; o índice único
    /// em events.contract continua sendo a guarda autoritativa.
    pub async fn has_event(
        &self,
        contract_id: Uuid,
        excluding_event: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM events \
             WHERE contract = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(contract_id)
        .bind(excluding_event)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create(
        &self,
        client: Uuid,
        status: bool,
        amount: f64,
        payment_due: DateTime<Utc>,
    ) -> Result<Contract, AppError> {
        let contract = sqlx::query_as::<_, Contract>(&format!(
            "INSERT INTO contracts (client, status, amount, payment_due) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CONTRACT_COLUMNS}"
        ))
        .bind(client)
        .bind(status)
        .bind(amount)
        .bind(payment_due)
        .fetch_one(&self.pool)
        .await?;
        Ok(contract)
    }

    pub async fn update(
        &self,
        id: Uuid,
        client: Uuid,
        status: bool,
        amount: f64,
        payment_due: DateTime<Utc>,
    ) -> Result<Contract, AppError> {
        let contract = sqlx::query_as::<_, Contract>(&format!(
            "UPDATE contracts SET client = $2, status = $3, amount = $4, \
             payment_due = $5, date_updated = NOW() \
             WHERE id = $1 \
             RETURNING {CONTRACT_COLUMNS}"
        ))
        .bind(id)
        .bind(client)
        .bind(status)
        .bind(amount)
        .bind(payment_due)
        .fetch_one(&self.pool)
        .await?;
        Ok(contract)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        // O evento associado (no máximo um) cai junto via CASCADE
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn push_date_filter(
    query: &mut sqlx::QueryBuilder<'_, Postgres>,
    column: &str,
    op: &str,
    value: Option<NaiveDate>,
) {
    if let Some(date) = value {
        query
            .push(format!(" AND {column}::date {op} "))
            .push_bind(date);
    }
}

fn push_amount_filter(
    query: &mut sqlx::QueryBuilder<'_, Postgres>,
    op: &str,
    value: Option<f64>,
) {
    if let Some(amount) = value {
        query.push(format!(" AND co.amount {op} ")).push_bind(amount);
    }
}
