use axum::extract::{Path, State};

use crate::api::response::{created, ok, ApiResult, JsonBody};
use crate::api::state::AppState;
use crate::application::CreateLoanRequest;
use crate::domain::{LoanCreated, LoanDetail, LoanRecord};

/// Responds with the loan id and its monthly installment.
pub async fn create_loan(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateLoanRequest>,
) -> ApiResult<LoanCreated> {
    let loan = state.service.create_loan(request).await?;
    Ok(created("Loan created successfully", loan))
}

pub async fn list_loans(State(state): State<AppState>) -> ApiResult<Vec<LoanRecord>> {
    Ok(ok(state.service.list_loans().await?))
}

pub async fn get_loan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LoanDetail> {
    Ok(ok(state.service.get_loan(&id).await?))
}
