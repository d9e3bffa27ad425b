use axum::extract::{Path, State};

use crate::api::response::{created, ok, ApiResult, JsonBody};
use crate::api::state::AppState;
use crate::application::{AmountRequest, TransferRequest};
use crate::domain::{Transaction, TransactionReceipt};

pub async fn deposit(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AmountRequest>,
) -> ApiResult<TransactionReceipt> {
    let receipt = state.service.deposit(request).await?;
    Ok(created("Deposit successful", receipt))
}

pub async fn withdraw(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AmountRequest>,
) -> ApiResult<TransactionReceipt> {
    let receipt = state.service.withdraw(request).await?;
    Ok(created("Withdrawal successful", receipt))
}

pub async fn transfer(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TransferRequest>,
) -> ApiResult<TransactionReceipt> {
    let receipt = state.service.transfer(request).await?;
    Ok(created("Transfer successful", receipt))
}

pub async fn list_transactions(State(state): State<AppState>) -> ApiResult<Vec<Transaction>> {
    Ok(ok(state.service.list_transactions().await?))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    Ok(ok(state.service.get_transaction(&id).await?))
}
