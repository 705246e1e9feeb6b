// src/config.rs

use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ClientRepository, ContractRepository, EventRepository, UserRepository},
    services::{
        auth::AuthService, client_service::ClientService, contract_service::ContractService,
        event_service::EventService, user_service::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub client_service: ClientService,
    pub contract_service: ContractService,
    pub event_service: EventService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let contract_repo = ContractRepository::new(db_pool.clone());
        let event_repo = EventRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let user_service = UserService::new(
            user_repo.clone(),
            client_repo.clone(),
            event_repo.clone(),
            db_pool.clone(),
        );
        let client_service = ClientService::new(client_repo.clone(), user_repo.clone());
        let contract_service = ContractService::new(contract_repo.clone(), client_repo);
        let event_service = EventService::new(event_repo, contract_repo, user_repo);

        Ok(Self {
            db_pool,
            auth_service,
            user_service,
            client_service,
            contract_service,
            event_service,
        })
    }
}
