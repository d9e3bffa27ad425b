use axum::extract::{Path, State};

use crate::api::response::{created, done, ok, ApiResult, JsonBody};
use crate::api::state::AppState;
use crate::application::{CreateAccountRequest, UpdateAccountStatusRequest};
use crate::domain::{AccountBalance, AccountDetail, AccountOpened, AccountView};

/// Served on both `POST /api/accounts` and `POST /api/accounts/create`.
pub async fn create_account(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateAccountRequest>,
) -> ApiResult<AccountOpened> {
    let account = state.service.create_account(request).await?;
    Ok(created("Account created successfully", account))
}

pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<Vec<AccountView>> {
    Ok(ok(state.service.list_accounts().await?))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(account_no): Path<String>,
) -> ApiResult<AccountDetail> {
    Ok(ok(state.service.get_account(&account_no).await?))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(account_no): Path<String>,
) -> ApiResult<AccountBalance> {
    Ok(ok(state.service.get_balance(&account_no).await?))
}

pub async fn update_account_status(
    State(state): State<AppState>,
    Path(account_no): Path<String>,
    JsonBody(request): JsonBody<UpdateAccountStatusRequest>,
) -> ApiResult<()> {
    state
        .service
        .update_account_status(&account_no, request)
        .await?;
    Ok(done("Account status updated successfully"))
}
