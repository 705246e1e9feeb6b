pub mod auth;
pub mod client_service;
pub mod contract_service;
pub mod event_service;
pub mod user_service;
