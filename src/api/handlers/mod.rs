//! Request handlers, one module per resource.

pub mod accounts;
pub mod customers;
pub mod health;
pub mod loans;
pub mod transactions;
