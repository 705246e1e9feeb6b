// src/permissions.rs
//
// Motor de permissões: predicados primitivos (papel do ator + posse do
// alvo) compostos numa árvore de expressão Any/All avaliada com
// curto-circuito. As regras por (entidade, verbo) são tabelas fixas; a
// posse do alvo é resolvida pelo controlador imediatamente antes da
// avaliação (leitura sempre fresca, sem cache).

use uuid::Uuid;

use crate::common::error::{AppError, MANAGEMENT_ONLY, NO_PERMISSION};
use crate::models::auth::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    // Baseados no ator (não exigem alvo)
    IsAuthenticated,
    IsManagementTeam,
    IsSalesTeam,
    IsSupportTeam,
    // Baseados no alvo (exigem a posse resolvida)
    IsClientSalesContact,
    IsContractSalesContact,
    IsEventSupportContact,
    IsEventContractSalesContact,
    IsClientEventSupportContact,
}

/// Posse do alvo, resolvida no momento da requisição.
#[derive(Debug, Clone, Default)]
pub struct Ownership {
    /// Contato de vendas da cadeia (cliente, ou cliente do contrato, ou
    /// cliente do contrato do evento).
    pub sales_contact: Option<Uuid>,
    /// Contato de suporte do evento alvo.
    pub support_contact: Option<Uuid>,
    /// Contatos de suporte dos eventos sob os contratos do cliente alvo.
    pub event_support_contacts: Vec<Uuid>,
}

impl Ownership {
    pub fn of_client(sales_contact: Uuid, event_support_contacts: Vec<Uuid>) -> Self {
        Ownership {
            sales_contact: Some(sales_contact),
            support_contact: None,
            event_support_contacts,
        }
    }

    pub fn of_contract(sales_contact: Uuid) -> Self {
        Ownership {
            sales_contact: Some(sales_contact),
            support_contact: None,
            event_support_contacts: Vec::new(),
        }
    }

    pub fn of_event(sales_contact: Uuid, support_contact: Option<Uuid>) -> Self {
        Ownership {
            sales_contact: Some(sales_contact),
            support_contact,
            event_support_contacts: Vec::new(),
        }
    }
}

impl Predicate {
    /// Predicados de alvo avaliam falso quando a requisição não tem alvo
    /// (operações de lista/criação não os usam nas tabelas).
    fn evaluate(self, actor: &User, target: Option<&Ownership>) -> bool {
        match self {
            Predicate::IsAuthenticated => true,
            Predicate::IsManagementTeam => actor.is_management(),
            Predicate::IsSalesTeam => actor.is_sales(),
            Predicate::IsSupportTeam => actor.is_support(),
            Predicate::IsClientSalesContact | Predicate::IsContractSalesContact => {
                target.is_some_and(|t| t.sales_contact == Some(actor.id))
            }
            Predicate::IsEventContractSalesContact => {
                target.is_some_and(|t| t.sales_contact == Some(actor.id))
            }
            Predicate::IsEventSupportContact => {
                target.is_some_and(|t| t.support_contact == Some(actor.id))
            }
            Predicate::IsClientEventSupportContact => {
                target.is_some_and(|t| t.event_support_contacts.contains(&actor.id))
            }
        }
    }
}

/// Árvore de expressão com curto-circuito: Any = OR, All = AND.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Is(Predicate),
    Any(&'static [Rule]),
    All(&'static [Rule]),
}

impl Rule {
    pub fn allows(&self, actor: &User, target: Option<&Ownership>) -> bool {
        match self {
            Rule::Is(predicate) => predicate.evaluate(actor, target),
            Rule::Any(branches) => branches.iter().any(|r| r.allows(actor, target)),
            Rule::All(branches) => branches.iter().all(|r| r.allows(actor, target)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Client,
    Contract,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// Regra + mensagem de negação. A negação é uniforme de propósito: nunca
/// revela qual checagem de posse falhou.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub rule: Rule,
    pub denial: &'static str,
}

const MANAGEMENT: Rule = Rule::Is(Predicate::IsManagementTeam);
const SALES: Rule = Rule::Is(Predicate::IsSalesTeam);
const SUPPORT: Rule = Rule::Is(Predicate::IsSupportTeam);
const AUTHENTICATED: Rule = Rule::Is(Predicate::IsAuthenticated);

const MANAGEMENT_ONLY_POLICY: Policy = Policy {
    rule: MANAGEMENT,
    denial: MANAGEMENT_ONLY,
};

const ANYONE: Policy = Policy {
    rule: AUTHENTICATED,
    denial: NO_PERMISSION,
};

const MANAGEMENT_OR_SALES: Policy = Policy {
    rule: Rule::Any(&[MANAGEMENT, SALES]),
    denial: NO_PERMISSION,
};

const CLIENT_OWNER: Policy = Policy {
    rule: Rule::Any(&[
        MANAGEMENT,
        Rule::All(&[SALES, Rule::Is(Predicate::IsClientSalesContact)]),
    ]),
    denial: NO_PERMISSION,
};

const CLIENT_RETRIEVE: Policy = Policy {
    rule: Rule::Any(&[
        MANAGEMENT,
        Rule::All(&[SALES, Rule::Is(Predicate::IsClientSalesContact)]),
        Rule::All(&[SUPPORT, Rule::Is(Predicate::IsClientEventSupportContact)]),
    ]),
    denial: NO_PERMISSION,
};

const CONTRACT_OWNER: Policy = Policy {
    rule: Rule::Any(&[
        MANAGEMENT,
        Rule::All(&[SALES, Rule::Is(Predicate::IsContractSalesContact)]),
    ]),
    denial: NO_PERMISSION,
};

const EVENT_RETRIEVE_OR_UPDATE: Policy = Policy {
    rule: Rule::Any(&[
        MANAGEMENT,
        Rule::All(&[SALES, Rule::Is(Predicate::IsEventContractSalesContact)]),
        Rule::All(&[SUPPORT, Rule::Is(Predicate::IsEventSupportContact)]),
    ]),
    denial: NO_PERMISSION,
};

const EVENT_DELETE: Policy = Policy {
    rule: Rule::Any(&[
        MANAGEMENT,
        Rule::All(&[SALES, Rule::Is(Predicate::IsEventContractSalesContact)]),
    ]),
    denial: NO_PERMISSION,
};

/// Tabela fixa por (entidade, verbo).
pub fn policy(entity: Entity, action: Action) -> Policy {
    match (entity, action) {
        // Usuários: console exclusivo do time de gestão
        (Entity::User, _) => MANAGEMENT_ONLY_POLICY,

        (Entity::Client, Action::List) => ANYONE,
        (Entity::Client, Action::Retrieve) => CLIENT_RETRIEVE,
        (Entity::Client, Action::Create) => MANAGEMENT_OR_SALES,
        (Entity::Client, Action::Update | Action::Delete) => CLIENT_OWNER,

        (Entity::Contract, Action::List) => ANYONE,
        (Entity::Contract, Action::Create) => MANAGEMENT_OR_SALES,
        (Entity::Contract, Action::Retrieve | Action::Update | Action::Delete) => CONTRACT_OWNER,

        (Entity::Event, Action::List) => ANYONE,
        (Entity::Event, Action::Create) => MANAGEMENT_OR_SALES,
        (Entity::Event, Action::Retrieve | Action::Update) => EVENT_RETRIEVE_OR_UPDATE,
        (Entity::Event, Action::Delete) => EVENT_DELETE,
    }
}

/// Ponto de entrada dos controladores: 403 com a mensagem da política
/// quando nenhum ramo autoriza.
pub fn authorize(
    entity: Entity,
    action: Action,
    actor: &User,
    target: Option<&Ownership>,
) -> Result<(), AppError> {
    let policy = policy(entity, action);
    if policy.rule.allows(actor, target) {
        Ok(())
    } else {
        Err(AppError::Forbidden(policy.denial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Team;
    use chrono::Utc;

    fn user(team: Team) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Eva".into(),
            last_name: "Geret".into(),
            username: "egeret".into(),
            password_hash: String::new(),
            team,
            is_staff: team == Team::Management,
            is_superuser: false,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    #[test]
    fn management_passes_every_table() {
        let manager = user(Team::Management);
        for entity in [Entity::User, Entity::Client, Entity::Contract, Entity::Event] {
            for action in [
                Action::List,
                Action::Retrieve,
                Action::Create,
                Action::Update,
                Action::Delete,
            ] {
                assert!(
                    authorize(entity, action, &manager, None).is_ok(),
                    "management denied on {entity:?}/{action:?}"
                );
            }
        }
    }

    #[test]
    fn user_console_is_management_only() {
        let sales = user(Team::Sales);
        let err = authorize(Entity::User, Action::List, &sales, None).unwrap_err();
        match err {
            AppError::Forbidden(message) => assert_eq!(message, MANAGEMENT_ONLY),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn sales_contact_can_update_own_client() {
        let sales = user(Team::Sales);
        let target = Ownership::of_client(sales.id, vec![]);
        assert!(authorize(Entity::Client, Action::Update, &sales, Some(&target)).is_ok());
    }

    #[test]
    fn foreign_sales_user_gets_the_generic_denial() {
        // Cenário de composição: vendedor que não é o contato do cliente
        // recebe a mensagem genérica, não a específica de posse.
        let sales = user(Team::Sales);
        let other_owner = Uuid::new_v4();
        let target = Ownership::of_client(other_owner, vec![]);
        let err =
            authorize(Entity::Client, Action::Retrieve, &sales, Some(&target)).unwrap_err();
        match err {
            AppError::Forbidden(message) => assert_eq!(message, NO_PERMISSION),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn support_sees_client_only_through_its_events() {
        let support = user(Team::Support);
        let owner = Uuid::new_v4();
        let reachable = Ownership::of_client(owner, vec![support.id]);
        assert!(authorize(Entity::Client, Action::Retrieve, &support, Some(&reachable)).is_ok());

        let unreachable = Ownership::of_client(owner, vec![Uuid::new_v4()]);
        assert!(
            authorize(Entity::Client, Action::Retrieve, &support, Some(&unreachable)).is_err()
        );
    }

    #[test]
    fn support_cannot_read_contract_details() {
        let support = user(Team::Support);
        let target = Ownership::of_contract(Uuid::new_v4());
        assert!(
            authorize(Entity::Contract, Action::Retrieve, &support, Some(&target)).is_err()
        );
    }

    #[test]
    fn event_retrieval_composes_role_and_ownership() {
        let sales = user(Team::Sales);
        let support = user(Team::Support);

        // Evento do vendedor dono, suporte designado é outro
        let owned_by_sales = Ownership::of_event(sales.id, Some(Uuid::new_v4()));
        assert!(
            authorize(Entity::Event, Action::Retrieve, &sales, Some(&owned_by_sales)).is_ok()
        );
        assert!(
            authorize(Entity::Event, Action::Retrieve, &support, Some(&owned_by_sales)).is_err()
        );

        // Evento designado ao suporte
        let assigned_to_support = Ownership::of_event(Uuid::new_v4(), Some(support.id));
        assert!(
            authorize(Entity::Event, Action::Retrieve, &support, Some(&assigned_to_support))
                .is_ok()
        );
    }

    #[test]
    fn support_cannot_delete_its_event() {
        let support = user(Team::Support);
        let target = Ownership::of_event(Uuid::new_v4(), Some(support.id));
        assert!(authorize(Entity::Event, Action::Delete, &support, Some(&target)).is_err());
    }

    #[test]
    fn target_predicates_fail_without_a_target() {
        let sales = user(Team::Sales);
        assert!(authorize(Entity::Client, Action::Retrieve, &sales, None).is_err());
    }

    #[test]
    fn support_can_create_nothing_but_reads_lists() {
        let support = user(Team::Support);
        assert!(authorize(Entity::Client, Action::List, &support, None).is_ok());
        assert!(authorize(Entity::Contract, Action::List, &support, None).is_ok());
        assert!(authorize(Entity::Event, Action::List, &support, None).is_ok());
        assert!(authorize(Entity::Client, Action::Create, &support, None).is_err());
        assert!(authorize(Entity::Contract, Action::Create, &support, None).is_err());
        assert!(authorize(Entity::Event, Action::Create, &support, None).is_err());
    }
}
