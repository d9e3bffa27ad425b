use thiserror::Error;

use crate::storage::LedgerError;

#[derive(Error, Debug)]
pub enum AppError {
    /// The request was rejected before reaching the ledger.
    #[error("{0}")]
    Validation(String),

    /// The ledger returned or affected zero rows. Holds the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Ledger(_) => 500,
        }
    }
}
