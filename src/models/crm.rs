// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub mobile: String,
    pub company_name: String,
    pub sales_contact: Uuid,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "john")]
    pub first_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "smith")]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "menin@black.com")]
    pub email: String,

    #[schema(example = "1111111111")]
    pub phone: String,

    #[schema(example = "222222")]
    pub mobile: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "la septième")]
    pub company_name: String,

    // Obrigatório para Management; ignorado para Sales (o próprio ator
    // vira o contato)
    pub sales_contact: Option<Uuid>,
}

// --- CONTRATO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Contract {
    pub id: Uuid,
    pub client: Uuid,
    pub status: bool,
    pub amount: f64,
    pub payment_due: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Contrato com o contato de vendas derivado do cliente (somente leitura,
/// nunca armazenado no contrato).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ContractDetail {
    pub id: Uuid,
    pub client: Uuid,
    pub sales_contact: Uuid,
    pub status: bool,
    pub amount: f64,
    pub payment_due: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContractPayload {
    // Option para que a ausência gere a mensagem da API em vez de um 422
    // do desserializador
    pub client: Option<Uuid>,

    // Omitido = não assinado
    #[serde(default)]
    pub status: bool,

    #[validate(range(min = 0.0, message = "<amount>: Amount can't be negative"))]
    #[schema(example = 2500.0)]
    pub amount: f64,

    pub payment_due: DateTime<Utc>,
}

// --- EVENTO ---

// Armazenado como SMALLINT ordinal no banco (1/2/3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[repr(i16)]
pub enum EventStatus {
    Incoming = 1,
    InProgress = 2,
    Closed = 3,
}

impl EventStatus {
    pub const LABEL_ERROR: &'static str =
        "Error in field <Event status>: Must be <Incoming>, <In progress> or <Closed>";

    /// Mapeia o rótulo de exibição da API para o ordinal armazenado.
    pub fn from_label(label: &str) -> Result<Self, String> {
        match label {
            "Incoming" => Ok(EventStatus::Incoming),
            "In progress" => Ok(EventStatus::InProgress),
            "Closed" => Ok(EventStatus::Closed),
            _ => Err(Self::LABEL_ERROR.to_string()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Incoming => "Incoming",
            EventStatus::InProgress => "In progress",
            EventStatus::Closed => "Closed",
        }
    }
}

// Na API o status circula sempre como rótulo
impl Serialize for EventStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub contract: Uuid,
    pub support_contact: Option<Uuid>,
    pub event_status: EventStatus,
    pub attendees: i32,
    pub event_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Evento com a cadeia de posse resolvida (contato de vendas do cliente do
/// contrato), usada pelos predicados de permissão.
#[derive(Debug, Clone, FromRow)]
pub struct EventDetail {
    #[sqlx(flatten)]
    pub event: Event,
    pub sales_contact: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EventPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Event zero")]
    pub name: String,

    pub contract: Option<Uuid>,

    // Somente atores fora do time de vendas podem preencher
    pub support_contact: Option<Uuid>,

    // Rótulo de exibição, convertido para ordinal na validação
    #[schema(example = "Incoming")]
    pub event_status: String,

    #[validate(range(min = 0, message = "<attendees>: Attendees can't be negative"))]
    #[schema(example = 50)]
    pub attendees: i32,

    pub event_date: DateTime<Utc>,

    #[schema(example = "Beware of dogs !")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_status_maps_display_labels_to_ordinals() {
        assert_eq!(EventStatus::from_label("Incoming").unwrap(), EventStatus::Incoming);
        assert_eq!(
            EventStatus::from_label("In progress").unwrap(),
            EventStatus::InProgress
        );
        assert_eq!(EventStatus::from_label("Closed").unwrap(), EventStatus::Closed);
        assert_eq!(EventStatus::Incoming as i16, 1);
        assert_eq!(EventStatus::InProgress as i16, 2);
        assert_eq!(EventStatus::Closed as i16, 3);
    }

    #[test]
    fn event_status_rejects_unknown_labels() {
        assert_eq!(
            EventStatus::from_label("Incomin").unwrap_err(),
            "Error in field <Event status>: Must be <Incoming>, <In progress> or <Closed>"
        );
    }

    #[test]
    fn event_status_serializes_as_its_label() {
        assert_eq!(
            serde_json::to_value(EventStatus::InProgress).unwrap(),
            serde_json::json!("In progress")
        );
    }
}
