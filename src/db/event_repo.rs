// src/db/event_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{AppError, FieldErrors},
    common::filters::parse_date_param,
    models::crm::{Event, EventDetail, EventStatus},
};

const EVENT_COLUMNS: &str =
    "id, name, contract, support_contact, event_status, attendees, event_date, notes, \
     date_created, date_updated";

const DETAIL_COLUMNS: &str =
    "e.id, e.name, e.contract, e.support_contact, e.event_status, e.attendees, \
     e.event_date, e.notes, e.date_created, e.date_updated, cl.sales_contact";

const DUPLICATE_EVENT: &str = "Sorry, there's already an event associated with this contract";

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Evento com a cadeia de posse (contato de vendas do cliente do
    /// contrato) já resolvida.
    pub async fn find_detail_by_id(&self, id: Uuid) -> Result<Option<EventDetail>, AppError> {
        let maybe_event = sqlx::query_as::<_, EventDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM events e \
             JOIN contracts co ON e.contract = co.id \
             JOIN clients cl ON co.client = cl.id \
             WHERE e.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_event)
    }

    pub async fn list(
        &self,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Event>, AppError> {
        let mut errors = FieldErrors::new();
        let event_date = parse_date_param(filters, "event_date", &mut errors);
        let event_date_after = parse_date_param(filters, "event_date_after", &mut errors);
        let event_date_before = parse_date_param(filters, "event_date_before", &mut errors);
        if !errors.is_empty() {
            return Err(AppError::Rules(errors));
        }

        let mut query = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT e.id, e.name, e.contract, e.support_contact, e.event_status, \
             e.attendees, e.event_date, e.notes, e.date_created, e.date_updated \
             FROM events e \
             JOIN contracts co ON e.contract = co.id \
             JOIN clients cl ON co.client = cl.id WHERE 1=1",
        );
        if let Some(last_name) = filters.get("last_name") {
            query.push(" AND cl.last_name = ").push_bind(last_name);
        }
        if let Some(email) = filters.get("email") {
            query.push(" AND cl.email = ").push_bind(email);
        }
        for (op, value) in [
            ("=", event_date),
            (">", event_date_after),
            ("<", event_date_before),
        ] {
            if let Some(date) = value {
                query
                    .push(format!(" AND e.event_date::date {op} "))
                    .push_bind(date);
            }
        }
        query.push(" ORDER BY e.date_created ASC");

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    /// Nomes dos eventos designados ao usuário, para a mensagem da guarda
    /// de exclusão.
    pub async fn names_by_support_contact(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM events WHERE support_contact = $1 ORDER BY date_created ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        contract: Uuid,
        support_contact: Option<Uuid>,
        event_status: EventStatus,
        attendees: i32,
        event_date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, contract, support_contact, event_status, \
             attendees, event_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(name)
        .bind(contract)
        .bind(support_contact)
        .bind(event_status)
        .bind(attendees)
        .bind(event_date)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Duas criações simultâneas para o mesmo contrato podem ambas
            // passar pela pré-checagem; o índice único decide.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::rule("contract", DUPLICATE_EVENT);
                }
            }
            e.into()
        })?;
        Ok(event)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        contract: Uuid,
        support_contact: Option<Uuid>,
        event_status: EventStatus,
        attendees: i32,
        event_date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET name = $2, contract = $3, support_contact = $4, \
             event_status = $5, attendees = $6, event_date = $7, notes = $8, \
             date_updated = NOW() \
             WHERE id = $1 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(contract)
        .bind(support_contact)
        .bind(event_status)
        .bind(attendees)
        .bind(event_date)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::rule("contract", DUPLICATE_EVENT);
                }
            }
            e.into()
        })?;
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
