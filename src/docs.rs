// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::refresh_token,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::retrieve_user,
        handlers::users::register_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::retrieve_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Contracts ---
        handlers::contracts::list_contracts,
        handlers::contracts::retrieve_contract,
        handlers::contracts::create_contract,
        handlers::contracts::update_contract,
        handlers::contracts::delete_contract,

        // --- Events ---
        handlers::events::list_events,
        handlers::events::retrieve_event,
        handlers::events::create_event,
        handlers::events::update_event,
        handlers::events::delete_event,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Team,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::RegisterUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::TokenPairResponse,
            models::auth::RefreshPayload,
            models::auth::AccessResponse,

            // --- CRM ---
            models::crm::Client,
            models::crm::ClientPayload,
            models::crm::Contract,
            models::crm::ContractDetail,
            models::crm::ContractPayload,
            models::crm::EventStatus,
            models::crm::Event,
            models::crm::EventPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação (par de tokens JWT)"),
        (name = "Users", description = "Cadastro e perfil (restrito à gestão)"),
        (name = "Clients", description = "Clientes e seus contatos de vendas"),
        (name = "Contracts", description = "Contratos por cliente"),
        (name = "Events", description = "Eventos de contratos assinados")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
