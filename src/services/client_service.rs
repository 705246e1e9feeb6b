// src/services/client_service.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::{AppError, FieldErrors},
    common::validators::{check_is_phone_number, check_letters_hyphen, title_case},
    db::{ClientRepository, UserRepository},
    models::auth::User,
    models::crm::{Client, ClientPayload},
    permissions::Ownership,
};

/// Mudança validada, pronta para persistir.
#[derive(Debug, PartialEq)]
pub struct ValidatedClientInput {
    pub first_name: String,
    pub last_name: String,
    pub sales_contact: Uuid,
}

/// Passo objeto puro. `resolved_contact` é o usuário apontado por
/// `payload.sales_contact`, resolvido pelo serviço quando o ator é da
/// gestão; vendedores viram o próprio contato e o campo enviado é
/// ignorado.
pub fn validate_client_rules(
    actor: &User,
    payload: &ClientPayload,
    resolved_contact: Option<&User>,
) -> Result<ValidatedClientInput, AppError> {
    let mut errors = FieldErrors::new();

    if let Err(message) = check_letters_hyphen(&payload.first_name, "first_name") {
        errors.entry("first_name".into()).or_default().push(message);
    }
    if let Err(message) = check_letters_hyphen(&payload.last_name, "last_name") {
        errors.entry("last_name".into()).or_default().push(message);
    }
    if let Err(message) = check_is_phone_number(&payload.phone, "phone") {
        errors.entry("phone".into()).or_default().push(message);
    }
    if let Err(message) = check_is_phone_number(&payload.mobile, "mobile") {
        errors.entry("mobile".into()).or_default().push(message);
    }

    let sales_contact = if actor.is_management() {
        match (payload.sales_contact, resolved_contact) {
            (None, _) => {
                errors
                    .entry("sales_contact".into())
                    .or_default()
                    .push("Please fill 'sales_contact' field".to_string());
                None
            }
            (Some(_), None) => {
                errors
                    .entry("sales_contact".into())
                    .or_default()
                    .push("This user doesn't exist.".to_string());
                None
            }
            (Some(_), Some(user)) if !user.is_sales() => {
                errors
                    .entry("sales_contact".into())
                    .or_default()
                    .push("Please choose a user belonging to Sales team".to_string());
                None
            }
            (Some(_), Some(user)) => Some(user.id),
        }
    } else {
        // Ator de vendas: o próprio ator é o contato
        Some(actor.id)
    };

    if !errors.is_empty() {
        return Err(AppError::Rules(errors));
    }

    Ok(ValidatedClientInput {
        first_name: title_case(&payload.first_name),
        last_name: title_case(&payload.last_name),
        sales_contact: sales_contact.expect("validated above"),
    })
}

#[derive(Clone)]
pub struct ClientService {
    client_repo: ClientRepository,
    user_repo: UserRepository,
}

impl ClientService {
    pub fn new(client_repo: ClientRepository, user_repo: UserRepository) -> Self {
        Self { client_repo, user_repo }
    }

    pub async fn get(&self, id: Uuid) -> Result<Client, AppError> {
        self.client_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("client", id))
    }

    /// Posse resolvida na hora, para os predicados de permissão.
    pub async fn ownership(&self, client: &Client) -> Result<Ownership, AppError> {
        let support_contacts = self.client_repo.event_support_contacts(client.id).await?;
        Ok(Ownership::of_client(client.sales_contact, support_contacts))
    }

    pub async fn list(&self, filters: &HashMap<String, String>) -> Result<Vec<Client>, AppError> {
        self.client_repo.list(filters).await
    }

    pub async fn create(&self, actor: &User, payload: &ClientPayload) -> Result<Client, AppError> {
        let input = self.validate(actor, payload).await?;
        self.client_repo
            .create(
                &input.first_name,
                &input.last_name,
                &payload.email,
                &payload.phone,
                &payload.mobile,
                &payload.company_name,
                input.sales_contact,
            )
            .await
    }

    pub async fn update(
        &self,
        actor: &User,
        existing: &Client,
        payload: &ClientPayload,
    ) -> Result<Client, AppError> {
        let input = self.validate(actor, payload).await?;
        self.client_repo
            .update(
                existing.id,
                &input.first_name,
                &input.last_name,
                &payload.email,
                &payload.phone,
                &payload.mobile,
                &payload.company_name,
                input.sales_contact,
            )
            .await
    }

    pub async fn delete(&self, existing: &Client) -> Result<(), AppError> {
        self.client_repo.delete(existing.id).await?;
        Ok(())
    }

    async fn validate(
        &self,
        actor: &User,
        payload: &ClientPayload,
    ) -> Result<ValidatedClientInput, AppError> {
        let resolved_contact = match (actor.is_management(), payload.sales_contact) {
            (true, Some(id)) => self.user_repo.find_by_id(id).await?,
            _ => None,
        };
        validate_client_rules(actor, payload, resolved_contact.as_ref())
    }
}
