// src/services/contract_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::{AppError, FieldErrors},
    common::validators::is_prior_to_created_date,
    db::{ClientRepository, ContractRepository},
    models::auth::User,
    models::crm::{Client, ContractDetail, ContractPayload},
    permissions::Ownership,
};

/// Passo objeto puro. `resolved_client` é o cliente apontado pelo payload;
/// `existing` é o contrato armazenado (atualizações): o vencimento é
/// comparado à data de criação armazenada, não à atual. `has_event` diz se
/// o contrato já tem evento (bloqueia voltar a não-assinado).
pub fn validate_contract_rules(
    actor: &User,
    payload: &ContractPayload,
    resolved_client: Option<&Client>,
    existing: Option<&ContractDetail>,
    has_event: bool,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    match (payload.client, resolved_client) {
        (None, _) => {
            errors
                .entry("client".into())
                .or_default()
                .push("Please enter id of client".to_string());
        }
        (Some(id), None) => {
            errors
                .entry("client".into())
                .or_default()
                .push(format!("Sorry, client {id} doesn't exist"));
        }
        (Some(_), Some(client)) => {
            if actor.is_sales() && client.sales_contact != actor.id {
                errors
                    .entry("client".into())
                    .or_default()
                    .push("Sorry, you are not the sales contact of this client".to_string());
            }
        }
    }

    if payload.amount < 0.0 {
        errors
            .entry("amount".into())
            .or_default()
            .push("<amount>: Amount can't be negative".to_string());
    }

    // Na criação a referência é a data atual (que vira date_created); na
    // atualização, a data de criação armazenada.
    let created = existing.map(|c| c.date_created).unwrap_or(now);
    if let Err(message) = is_prior_to_created_date(payload.payment_due, created) {
        errors.entry("payment_due".into()).or_default().push(message);
    }

    if let Some(stored) = existing {
        if stored.status && !payload.status && has_event {
            errors.entry("status".into()).or_default().push(
                "Sorry, this contract's event already exists, it can't be unsigned".to_string(),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Rules(errors))
    }
}

#[derive(Clone)]
pub struct ContractService {
    contract_repo: ContractRepository,
    client_repo: ClientRepository,
}

impl ContractService {
    pub fn new(contract_repo: ContractRepository, client_repo: ClientRepository) -> Self {
        Self { contract_repo, client_repo }
    }

    pub async fn get(&self, id: Uuid) -> Result<ContractDetail, AppError> {
        self.contract_repo
            .find_detail_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("contract", id))
    }

    pub fn ownership(&self, contract: &ContractDetail) -> Ownership {
        Ownership::of_contract(contract.sales_contact)
    }

    pub async fn list(
        &self,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<ContractDetail>, AppError> {
        self.contract_repo.list(filters).await
    }

    pub async fn create(
        &self,
        actor: &User,
        payload: &ContractPayload,
    ) -> Result<ContractDetail, AppError> {
        let client = self.resolve_client(payload).await?;
        validate_contract_rules(actor, payload, client.as_ref(), None, false, Utc::now())?;

        let client = client.expect("client resolved by validation");
        let contract = self
            .contract_repo
            .create(
                client.id,
                payload.status,
                payload.amount,
                payload.payment_due,
            )
            .await?;
        Ok(ContractDetail {
            id: contract.id,
            client: contract.client,
            sales_contact: client.sales_contact,
            status: contract.status,
            amount: contract.amount,
            payment_due: contract.payment_due,
            date_created: contract.date_created,
            date_updated: contract.date_updated,
        })
    }

    pub async fn update(
        &self,
        actor: &User,
        existing: &ContractDetail,
        payload: &ContractPayload,
    ) -> Result<ContractDetail, AppError> {
        let client = self.resolve_client(payload).await?;
        let has_event = self.contract_repo.has_event(existing.id, None).await?;
        validate_contract_rules(
            actor,
            payload,
            client.as_ref(),
            Some(existing),
            has_event,
            Utc::now(),
        )?;

        let client = client.expect("client resolved by validation");
        let contract = self
            .contract_repo
            .update(
                existing.id,
                client.id,
                payload.status,
                payload.amount,
                payload.payment_due,
            )
            .await?;
        Ok(ContractDetail {
            id: contract.id,
            client: contract.client,
            sales_contact: client.sales_contact,
            status: contract.status,
            amount: contract.amount,
            payment_due: contract.payment_due,
            date_created: contract.date_created,
            date_updated: contract.date_updated,
        })
    }

    pub async fn delete(&self, existing: &ContractDetail) -> Result<(), AppError> {
        self.contract_repo.delete(existing.id).await?;
        Ok(())
    }

    async fn resolve_client(&self, payload: &ContractPayload) -> Result<Option<Client>, AppError> {
        match payload.client {
            Some(id) => Ok(self.client_repo.find_by_id(id).await?),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Team;
    use chrono::Duration;

    fn user(team: Team) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Yves".into(),
            last_name: "Antou".into(),
            username: "yantou".into(),
            password_hash: String::new(),
            team,
            is_staff: team == Team::Management,
            is_superuser: false,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    fn client(sales_contact: Uuid) -> Client {
        Client {
            id: Uuid::new_v4(),
            first_name: "Dark".into(),
            last_name: "Vador".into(),
            email: "star@wars.com".into(),
            phone: "12345678".into(),
            mobile: "888888".into(),
            company_name: "L'Empire".into(),
            sales_contact,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    fn detail(client: &Client, status: bool, created: DateTime<Utc>) -> ContractDetail {
        ContractDetail {
            id: Uuid::new_v4(),
            client: client.id,
            sales_contact: client.sales_contact,
            status,
            amount: 10000.0,
            payment_due: created + Duration::days(20),
            date_created: created,
            date_updated: created,
        }
    }

    fn payload(client: Option<Uuid>, payment_due: DateTime<Utc>) -> ContractPayload {
        ContractPayload { client, status: false, amount: 2500.0, payment_due }
    }

    fn field(err: &AppError, key: &str) -> Vec<String> {
        match err {
            AppError::Rules(map) => map.get(key).cloned().unwrap_or_default(),
            other => panic!("expected Rules, got {other:?}"),
        }
    }

    #[test]
    fn missing_client_id_is_reported() {
        let sales = user(Team::Sales);
        let now = Utc::now();
        let err = validate_contract_rules(
            &sales,
            &payload(None, now + Duration::days(50)),
            None,
            None,
            false,
            now,
        )
        .unwrap_err();
        assert_eq!(field(&err, "client")[0], "Please enter id of client");
    }

    #[test]
    fn unknown_client_id_is_reported_with_its_id() {
        let sales = user(Team::Sales);
        let now = Utc::now();
        let id = Uuid::new_v4();
        let err = validate_contract_rules(
            &sales,
            &payload(Some(id), now + Duration::days(50)),
            None,
            None,
            false,
            now,
        )
        .unwrap_err();
        assert_eq!(field(&err, "client")[0], format!("Sorry, client {id} doesn't exist"));
    }

    #[test]
    fn sales_actor_must_own_the_client() {
        let sales = user(Team::Sales);
        let someone_else = Uuid::new_v4();
        let target = client(someone_else);
        let now = Utc::now();
        let err = validate_contract_rules(
            &sales,
            &payload(Some(target.id), now + Duration::days(50)),
            Some(&target),
            None,
            false,
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "client")[0],
            "Sorry, you are not the sales contact of this client"
        );
    }

    #[test]
    fn management_skips_the_ownership_check() {
        let manager = user(Team::Management);
        let target = client(Uuid::new_v4());
        let now = Utc::now();
        assert!(validate_contract_rules(
            &manager,
            &payload(Some(target.id), now + Duration::days(50)),
            Some(&target),
            None,
            false,
            now,
        )
        .is_ok());
    }

    #[test]
    fn payment_due_cannot_precede_creation_on_create() {
        let sales = user(Team::Sales);
        let target = client(sales.id);
        let now = Utc::now();
        let err = validate_contract_rules(
            &sales,
            &payload(Some(target.id), now - Duration::days(30)),
            Some(&target),
            None,
            false,
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "payment_due")[0],
            "Payment due date can't be prior to creation date"
        );
    }

    #[test]
    fn update_compares_against_the_stored_creation_date() {
        let sales = user(Team::Sales);
        let target = client(sales.id);
        let created = Utc::now() - Duration::days(10);
        let stored = detail(&target, false, created);
        // Vencimento antes de agora, mas depois da criação armazenada
        let due = created + Duration::days(5);
        assert!(validate_contract_rules(
            &sales,
            &payload(Some(target.id), due),
            Some(&target),
            Some(&stored),
            false,
            Utc::now(),
        )
        .is_ok());
    }

    #[test]
    fn signed_contract_with_event_cannot_be_unsigned() {
        let manager = user(Team::Management);
        let target = client(Uuid::new_v4());
        let created = Utc::now() - Duration::days(10);
        let stored = detail(&target, true, created);
        let err = validate_contract_rules(
            &manager,
            &payload(Some(target.id), created + Duration::days(20)),
            Some(&target),
            Some(&stored),
            true,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "status")[0],
            "Sorry, this contract's event already exists, it can't be unsigned"
        );
    }

    #[test]
    fn negative_amount_is_rejected() {
        let sales = user(Team::Sales);
        let target = client(sales.id);
        let now = Utc::now();
        let mut bad = payload(Some(target.id), now + Duration::days(50));
        bad.amount = -1.0;
        let err =
            validate_contract_rules(&sales, &bad, Some(&target), None, false, now).unwrap_err();
        assert_eq!(field(&err, "amount")[0], "<amount>: Amount can't be negative");
    }

    #[test]
    fn omitted_status_defaults_to_unsigned() {
        let raw = serde_json::json!({
            "client": Uuid::new_v4(),
            "amount": 2500.0,
            "payment_due": "2030-01-18T10:20:00Z",
        });
        let parsed: ContractPayload = serde_json::from_value(raw).unwrap();
        assert!(!parsed.status);
    }
}
