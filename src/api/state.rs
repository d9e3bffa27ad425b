use std::sync::Arc;

use crate::application::BankingService;
use crate::storage::LedgerGateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: BankingService,
}

impl AppState {
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Self {
        Self {
            service: BankingService::new(gateway),
        }
    }
}
