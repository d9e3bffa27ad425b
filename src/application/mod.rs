// Application layer: request validation and the service that fronts the ledger.
// Every use case is validate, one gateway call, then map the outcome.

pub mod error;
pub mod requests;
pub mod service;

pub use error::*;
pub use requests::*;
pub use service::*;
