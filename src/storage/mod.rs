mod gateway;
mod repository;

pub use gateway::*;
pub use repository::*;

/// SQL migration for the initial ledger schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
