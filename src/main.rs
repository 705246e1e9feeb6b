//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod permissions;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Bring-up explícito: numa base vazia cria o superusuário de gestão,
    // senão o cadastro (restrito à gestão) fica inalcançável.
    app_state
        .user_service
        .ensure_initial_superuser(std::env::var("INITIAL_ADMIN_PASSWORD").ok())
        .await
        .expect("Falha ao criar o superusuário inicial.");

    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/login/", post(handlers::auth::login))
        .route("/token/refresh/", post(handlers::auth::refresh_token));

    // Rotas protegidas pelo middleware de autenticação
    let user_routes = Router::new()
        .route(
            "/users/",
            get(handlers::users::list_users).post(handlers::users::register_user),
        )
        .route(
            "/users/{id}/",
            get(handlers::users::retrieve_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        );

    let client_routes = Router::new()
        .route(
            "/clients/",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clients/{id}/",
            get(handlers::clients::retrieve_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        );

    let contract_routes = Router::new()
        .route(
            "/contracts/",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route(
            "/contracts/{id}/",
            get(handlers::contracts::retrieve_contract)
                .put(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        );

    let event_routes = Router::new()
        .route(
            "/events/",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/events/{id}/",
            get(handlers::events::retrieve_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        );

    let protected_routes = Router::new()
        .merge(user_routes)
        .merge(client_routes)
        .merge(contract_routes)
        .merge(event_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/crm", auth_routes.merge(protected_routes))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
