// src/services/event_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::{AppError, FieldErrors},
    db::{ContractRepository, EventRepository, UserRepository},
    models::auth::User,
    models::crm::{ContractDetail, Event, EventDetail, EventPayload, EventStatus},
    permissions::Ownership,
};

/// Mudança validada do evento.
#[derive(Debug, PartialEq)]
pub struct ValidatedEventInput {
    pub contract: Uuid,
    pub event_status: EventStatus,
    /// Contato validado vindo do payload; None = sem mudança (atualização)
    /// ou sem contato (criação).
    pub support_contact: Option<Uuid>,
}

/// Passo objeto puro. `contract_has_other_event` exclui o próprio evento
/// em atualizações; `resolved_support` é o usuário apontado por
/// `payload.support_contact`, resolvido quando o ator pode preenchê-lo.
pub fn validate_event_rules(
    actor: &User,
    payload: &EventPayload,
    resolved_contract: Option<&ContractDetail>,
    contract_has_other_event: bool,
    resolved_support: Option<&User>,
    now: DateTime<Utc>,
) -> Result<ValidatedEventInput, AppError> {
    let mut errors = FieldErrors::new();

    let contract = match (payload.contract, resolved_contract) {
        (None, _) => {
            errors
                .entry("contract".into())
                .or_default()
                .push("Please enter id of contract".to_string());
            None
        }
        (Some(id), None) => {
            errors
                .entry("contract".into())
                .or_default()
                .push(format!("Sorry, contract {id} doesn't exist"));
            None
        }
        (Some(_), Some(contract)) => {
            let entry = errors.entry("contract".into()).or_default();
            if !contract.status {
                entry.push("Sorry, this contract isn't signed yet".to_string());
            }
            if contract_has_other_event {
                entry.push(
                    "Sorry, there's already an event associated with this contract".to_string(),
                );
            }
            if actor.is_sales() && contract.sales_contact != actor.id {
                entry.push("Sorry, you are not the sales contact of this client".to_string());
            }
            if entry.is_empty() {
                errors.remove("contract");
            }
            Some(contract.id)
        }
    };

    // Rótulo de exibição -> ordinal, depois a consistência temporal
    let event_status = match EventStatus::from_label(&payload.event_status) {
        Ok(status) => {
            let temporal_error = match status {
                EventStatus::Incoming if payload.event_date < now => Some(
                    "This event can't be incoming since its date is earlier \
                     than the current date",
                ),
                EventStatus::InProgress | EventStatus::Closed if payload.event_date > now => Some(
                    "This event can't be in progress or closed since its date is later \
                     than the current date",
                ),
                _ => None,
            };
            if let Some(message) = temporal_error {
                errors
                    .entry("event_status".into())
                    .or_default()
                    .push(message.to_string());
            }
            Some(status)
        }
        Err(message) => {
            errors.entry("event_status".into()).or_default().push(message);
            None
        }
    };

    if payload.attendees < 0 {
        errors
            .entry("attendees".into())
            .or_default()
            .push("<attendees>: Attendees can't be negative".to_string());
    }

    let support_contact = match payload.support_contact {
        None => None,
        Some(id) => {
            if actor.is_sales() {
                // Rejeitado de cara, mesmo que o id fosse válido
                errors.entry("support_contact".into()).or_default().push(
                    "Only users of management team can change/add support_contact. \
                     Please don't use this field."
                        .to_string(),
                );
                None
            } else {
                match resolved_support {
                    None => {
                        errors
                            .entry("support_contact".into())
                            .or_default()
                            .push(format!("Sorry, user {id} doesn't exist"));
                        None
                    }
                    Some(user) if !user.is_support() => {
                        errors
                            .entry("support_contact".into())
                            .or_default()
                            .push(format!("Sorry, user {id} isn't member of support team"));
                        None
                    }
                    Some(user) => Some(user.id),
                }
            }
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Rules(errors));
    }

    Ok(ValidatedEventInput {
        contract: contract.expect("validated above"),
        event_status: event_status.expect("validated above"),
        support_contact,
    })
}

#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    contract_repo: ContractRepository,
    user_repo: UserRepository,
}

impl EventService {
    pub fn new(
        event_repo: EventRepository,
        contract_repo: ContractRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { event_repo, contract_repo, user_repo }
    }

    pub async fn get(&self, id: Uuid) -> Result<EventDetail, AppError> {
        self.event_repo
            .find_detail_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("event", id))
    }

    pub fn ownership(&self, event: &EventDetail) -> Ownership {
        Ownership::of_event(event.sales_contact, event.event.support_contact)
    }

    pub async fn list(&self, filters: &HashMap<String, String>) -> Result<Vec<Event>, AppError> {
        self.event_repo.list(filters).await
    }

    pub async fn create(&self, actor: &User, payload: &EventPayload) -> Result<Event, AppError> {
        let contract = self.resolve_contract(payload).await?;
        let has_event = match &contract {
            Some(contract) => self.contract_repo.has_event(contract.id, None).await?,
            None => false,
        };
        let support = self.resolve_support(actor, payload).await?;
        let input = validate_event_rules(
            actor,
            payload,
            contract.as_ref(),
            has_event,
            support.as_ref(),
            Utc::now(),
        )?;

        self.event_repo
            .create(
                &payload.name,
                input.contract,
                input.support_contact,
                input.event_status,
                payload.attendees,
                payload.event_date,
                payload.notes.as_deref(),
            )
            .await
    }

    pub async fn update(
        &self,
        actor: &User,
        existing: &EventDetail,
        payload: &EventPayload,
    ) -> Result<Event, AppError> {
        let contract = self.resolve_contract(payload).await?;
        let has_event = match &contract {
            // Excluindo o próprio evento: manter o contrato atual não é
            // uma duplicata
            Some(contract) => {
                self.contract_repo
                    .has_event(contract.id, Some(existing.event.id))
                    .await?
            }
            None => false,
        };
        let support = self.resolve_support(actor, payload).await?;
        let input = validate_event_rules(
            actor,
            payload,
            contract.as_ref(),
            has_event,
            support.as_ref(),
            Utc::now(),
        )?;

        // Campo ausente preserva o contato designado
        let support_contact = input.support_contact.or(existing.event.support_contact);
        self.event_repo
            .update(
                existing.event.id,
                &payload.name,
                input.contract,
                support_contact,
                input.event_status,
                payload.attendees,
                payload.event_date,
                payload.notes.as_deref(),
            )
            .await
    }

    pub async fn delete(&self, existing: &EventDetail) -> Result<(), AppError> {
        self.event_repo.delete(existing.event.id).await?;
        Ok(())
    }

    async fn resolve_contract(
        &self,
        payload: &EventPayload,
    ) -> Result<Option<ContractDetail>, AppError> {
        match payload.contract {
            Some(id) => Ok(self.contract_repo.find_detail_by_id(id).await?),
            None => Ok(None),
        }
    }

    async fn resolve_support(
        &self,
        actor: &User,
        payload: &EventPayload,
    ) -> Result<Option<User>, AppError> {
        // Para atores de vendas nem resolve: o preenchimento em si é o erro
        match (actor.is_sales(), payload.support_contact) {
            (false, Some(id)) => Ok(self.user_repo.find_by_id(id).await?),
            _ => Ok(None),
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
            first_name: "Ella".into(),
            last_name: "Compagne".into(),
            username: "ecompagne".into(),
            password_hash: String::new(),
            team,
            is_staff: team == Team::Management,
            is_superuser: false,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    fn contract(sales_contact: Uuid, status: bool) -> ContractDetail {
        let now = Utc::now();
        ContractDetail {
            id: Uuid::new_v4(),
            client: Uuid::new_v4(),
            sales_contact,
            status,
            amount: 25000.0,
            payment_due: now + Duration::days(50),
            date_created: now,
            date_updated: now,
        }
    }

    fn payload(contract: Option<Uuid>, event_date: DateTime<Utc>) -> EventPayload {
        EventPayload {
            name: "Event zero".into(),
            contract,
            support_contact: None,
            event_status: "Incoming".into(),
            attendees: 50,
            event_date,
            notes: Some("Beware of dogs !".into()),
        }
    }

    fn field(err: &AppError, key: &str) -> Vec<String> {
        match err {
            AppError::Rules(map) => map.get(key).cloned().unwrap_or_default(),
            other => panic!("expected Rules, got {other:?}"),
        }
    }

    #[test]
    fn unknown_contract_is_reported_with_its_id() {
        let sales = user(Team::Sales);
        let now = Utc::now();
        let id = Uuid::new_v4();
        let err = validate_event_rules(
            &sales,
            &payload(Some(id), now + Duration::days(20)),
            None,
            false,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(field(&err, "contract")[0], format!("Sorry, contract {id} doesn't exist"));
    }

    #[test]
    fn unsigned_contract_is_rejected() {
        let sales = user(Team::Sales);
        let target = contract(sales.id, false);
        let now = Utc::now();
        let err = validate_event_rules(
            &sales,
            &payload(Some(target.id), now + Duration::days(20)),
            Some(&target),
            false,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(field(&err, "contract")[0], "Sorry, this contract isn't signed yet");
    }

    #[test]
    fn second_event_on_a_contract_is_rejected() {
        let manager = user(Team::Management);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let err = validate_event_rules(
            &manager,
            &payload(Some(target.id), now + Duration::days(20)),
            Some(&target),
            true,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "contract")[0],
            "Sorry, there's already an event associated with this contract"
        );
    }

    #[test]
    fn sales_actor_must_own_the_contract_chain() {
        let sales = user(Team::Sales);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let err = validate_event_rules(
            &sales,
            &payload(Some(target.id), now + Duration::days(20)),
            Some(&target),
            false,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "contract")[0],
            "Sorry, you are not the sales contact of this client"
        );
    }

    #[test]
    fn bad_status_label_is_rejected() {
        let sales = user(Team::Sales);
        let target = contract(sales.id, true);
        let now = Utc::now();
        let mut bad = payload(Some(target.id), now + Duration::days(20));
        bad.event_status = "Incomin".into();
        let err =
            validate_event_rules(&sales, &bad, Some(&target), false, None, now).unwrap_err();
        assert_eq!(
            field(&err, "event_status")[0],
            "Error in field <Event status>: Must be <Incoming>, <In progress> or <Closed>"
        );
    }

    #[test]
    fn incoming_event_cannot_be_in_the_past() {
        let manager = user(Team::Management);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let err = validate_event_rules(
            &manager,
            &payload(Some(target.id), now - Duration::days(30)),
            Some(&target),
            false,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "event_status")[0],
            "This event can't be incoming since its date is earlier than the current date"
        );
    }

    #[test]
    fn in_progress_event_cannot_be_in_the_future() {
        let manager = user(Team::Management);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let mut future = payload(Some(target.id), now + Duration::days(20));
        future.event_status = "In progress".into();
        let err =
            validate_event_rules(&manager, &future, Some(&target), false, None, now).unwrap_err();
        assert_eq!(
            field(&err, "event_status")[0],
            "This event can't be in progress or closed since its date is later \
             than the current date"
        );
    }

    #[test]
    fn closed_event_dated_now_passes() {
        let manager = user(Team::Management);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let mut closed = payload(Some(target.id), now);
        closed.event_status = "Closed".into();
        let input =
            validate_event_rules(&manager, &closed, Some(&target), false, None, now).unwrap();
        assert_eq!(input.event_status, EventStatus::Closed);
    }

    #[test]
    fn sales_actor_cannot_supply_support_contact() {
        let sales = user(Team::Sales);
        let support = user(Team::Support);
        let target = contract(sales.id, true);
        let now = Utc::now();
        let mut with_support = payload(Some(target.id), now);
        with_support.event_status = "Closed".into();
        with_support.support_contact = Some(support.id);
        // Mesmo com um id perfeitamente válido
        let err = validate_event_rules(
            &sales,
            &with_support,
            Some(&target),
            false,
            Some(&support),
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "support_contact")[0],
            "Only users of management team can change/add support_contact. \
             Please don't use this field."
        );
    }

    #[test]
    fn support_contact_must_exist() {
        let manager = user(Team::Management);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut with_support = payload(Some(target.id), now);
        with_support.event_status = "Closed".into();
        with_support.support_contact = Some(id);
        let err =
            validate_event_rules(&manager, &with_support, Some(&target), false, None, now)
                .unwrap_err();
        assert_eq!(
            field(&err, "support_contact")[0],
            format!("Sorry, user {id} doesn't exist")
        );
    }

    #[test]
    fn support_contact_must_belong_to_support_team() {
        let manager = user(Team::Management);
        let other_sales = user(Team::Sales);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let mut with_support = payload(Some(target.id), now);
        with_support.event_status = "Closed".into();
        with_support.support_contact = Some(other_sales.id);
        let err = validate_event_rules(
            &manager,
            &with_support,
            Some(&target),
            false,
            Some(&other_sales),
            now,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "support_contact")[0],
            format!("Sorry, user {} isn't member of support team", other_sales.id)
        );
    }

    #[test]
    fn management_with_valid_support_contact_passes() {
        let manager = user(Team::Management);
        let support = user(Team::Support);
        let target = contract(Uuid::new_v4(), true);
        let now = Utc::now();
        let mut with_support = payload(Some(target.id), now);
        with_support.event_status = "In progress".into();
        with_support.support_contact = Some(support.id);
        let input = validate_event_rules(
            &manager,
            &with_support,
            Some(&target),
            false,
            Some(&support),
            now,
        )
        .unwrap();
        assert_eq!(input.support_contact, Some(support.id));
        assert_eq!(input.event_status, EventStatus::InProgress);
    }
}
