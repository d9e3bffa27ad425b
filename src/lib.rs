pub mod api;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod server;
pub mod storage;

pub use application::BankingService;
pub use domain::*;
pub use storage::{LedgerGateway, Repository};
