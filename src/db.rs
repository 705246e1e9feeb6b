pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod event_repo;
pub use event_repo::EventRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
